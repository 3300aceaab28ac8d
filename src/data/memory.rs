use crate::domain::error::DomainError;
use crate::domain::models::{Ingredient, InventoryEntry, NewRecipe, Recipe};
use crate::domain::repository::{
    IngredientRepository, InventoryRepository, RecipeRepository, UserRepository,
};
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

#[derive(Default)]
struct Tables {
    next_user_id: i64,
    next_ingredient_id: i64,
    next_recipe_id: i64,
    users: HashMap<i64, User>,
    ingredients: HashMap<i64, Ingredient>,
    ingredient_names: HashMap<String, i64>,
    recipes: BTreeMap<i64, Recipe>,
    inventory: BTreeSet<InventoryEntry>,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

/// Process-local store. Every table sits behind one lock, so the
/// read-then-insert sequences below are atomic.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    #[instrument(skip(self, password_hash))]
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        trace!("Acquiring write lock for user storage");
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == username) {
            return Err(DomainError::Conflict(format!("username {username} is taken")).into());
        }
        let user = User {
            id: Tables::next_id(&mut tables.next_user_id),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        tables.users.insert(user.id, user.clone());
        debug!(user_id = user.id, username = %user.username, "User saved to memory storage");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        let user = tables.users.values().find(|u| u.username == username).cloned();
        trace!(found = user.is_some(), "Looked up user by username");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        let user = tables.users.get(&id).cloned();
        trace!(found = user.is_some(), "Looked up user by id");
        Ok(user)
    }
}

#[async_trait]
impl RecipeRepository for InMemoryStore {
    #[instrument(skip(self, recipe), fields(name = %recipe.name))]
    async fn add_recipe(&self, recipe: NewRecipe) -> Result<Recipe> {
        let mut tables = self.tables.write().await;
        let recipe = Recipe {
            id: Tables::next_id(&mut tables.next_recipe_id),
            name: recipe.name,
            ingredients: recipe.ingredients,
            instructions: recipe.instructions,
        };
        tables.recipes.insert(recipe.id, recipe.clone());
        debug!(recipe_id = recipe.id, "Recipe saved to memory storage");
        Ok(recipe)
    }

    async fn find_recipe(&self, id: i64) -> Result<Option<Recipe>> {
        Ok(self.tables.read().await.recipes.get(&id).cloned())
    }

    async fn list_recipes(&self) -> Result<Vec<Recipe>> {
        Ok(self.tables.read().await.recipes.values().cloned().collect())
    }
}

#[async_trait]
impl IngredientRepository for InMemoryStore {
    #[instrument(skip(self))]
    async fn find_or_create_ingredient(&self, name: &str) -> Result<Ingredient> {
        let mut tables = self.tables.write().await;
        if let Some(id) = tables.ingredient_names.get(name) {
            return Ok(tables.ingredients[id].clone());
        }
        let ingredient = Ingredient {
            id: Tables::next_id(&mut tables.next_ingredient_id),
            name: name.to_string(),
        };
        tables.ingredient_names.insert(ingredient.name.clone(), ingredient.id);
        tables.ingredients.insert(ingredient.id, ingredient.clone());
        debug!(ingredient_id = ingredient.id, "Ingredient created");
        Ok(ingredient)
    }

    async fn find_ingredient_by_name(&self, name: &str) -> Result<Option<Ingredient>> {
        let tables = self.tables.read().await;
        Ok(tables
            .ingredient_names
            .get(name)
            .map(|id| tables.ingredients[id].clone()))
    }
}

#[async_trait]
impl InventoryRepository for InMemoryStore {
    #[instrument(skip(self))]
    async fn add_entry(&self, user_id: i64, ingredient_id: i64) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(DomainError::NotFound(format!("user {user_id}")).into());
        }
        if !tables.ingredients.contains_key(&ingredient_id) {
            return Err(DomainError::NotFound(format!("ingredient {ingredient_id}")).into());
        }
        let inserted = tables.inventory.insert(InventoryEntry {
            user_id,
            ingredient_id,
        });
        trace!(inserted, "Inventory entry stored");
        Ok(inserted)
    }

    #[instrument(skip(self))]
    async fn remove_entries(&self, user_id: i64, ingredient_id: i64) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let removed = tables.inventory.remove(&InventoryEntry {
            user_id,
            ingredient_id,
        });
        Ok(u64::from(removed))
    }

    async fn list_ingredient_names(&self, user_id: i64) -> Result<Vec<String>> {
        let tables = self.tables.read().await;
        Ok(tables
            .inventory
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .filter_map(|entry| tables.ingredients.get(&entry.ingredient_id))
            .map(|ingredient| ingredient.name.clone())
            .collect())
    }
}
