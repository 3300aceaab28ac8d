use crate::domain::models::{Ingredient, NewRecipe, Recipe};
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `DomainError::Conflict` when the username is taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>>;
}

#[async_trait]
pub trait RecipeRepository: Send + Sync {
    async fn add_recipe(&self, recipe: NewRecipe) -> Result<Recipe>;
    async fn find_recipe(&self, id: i64) -> Result<Option<Recipe>>;
    /// All recipes in insertion order.
    async fn list_recipes(&self) -> Result<Vec<Recipe>>;
}

#[async_trait]
pub trait IngredientRepository: Send + Sync {
    /// Exact, case-sensitive lookup; creates the row when absent. Concurrent
    /// callers with the same name always get the same row back.
    async fn find_or_create_ingredient(&self, name: &str) -> Result<Ingredient>;
    async fn find_ingredient_by_name(&self, name: &str) -> Result<Option<Ingredient>>;
}

#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Returns false when the user already owns the ingredient.
    async fn add_entry(&self, user_id: i64, ingredient_id: i64) -> Result<bool>;
    async fn remove_entries(&self, user_id: i64, ingredient_id: i64) -> Result<u64>;
    async fn list_ingredient_names(&self, user_id: i64) -> Result<Vec<String>>;
}
