use crate::domain::error::DomainError;
use crate::domain::models::{Ingredient, NewRecipe, Recipe};
use crate::domain::repository::{IngredientRepository, RecipeRepository};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, instrument};

pub struct CatalogService {
    recipes: Arc<dyn RecipeRepository>,
    ingredients: Arc<dyn IngredientRepository>,
}

impl CatalogService {
    pub fn new(
        recipes: Arc<dyn RecipeRepository>,
        ingredients: Arc<dyn IngredientRepository>,
    ) -> Self {
        Self {
            recipes,
            ingredients,
        }
    }

    #[instrument(skip(self, req), fields(name = %req.name))]
    pub async fn add_recipe(&self, req: NewRecipe) -> Result<Recipe> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(DomainError::Validation("Recipe name is required".to_string()).into());
        }
        if req.ingredients.trim().is_empty() {
            return Err(DomainError::Validation("Ingredients are required".to_string()).into());
        }
        if req.instructions.trim().is_empty() {
            return Err(DomainError::Validation("Instructions are required".to_string()).into());
        }

        let recipe = self
            .recipes
            .add_recipe(NewRecipe {
                name: name.to_string(),
                ingredients: req.ingredients,
                instructions: req.instructions,
            })
            .await?;
        info!(recipe_id = recipe.id, "Recipe added");
        Ok(recipe)
    }

    pub async fn get_recipe(&self, id: i64) -> Result<Recipe> {
        self.recipes
            .find_recipe(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Recipe {} not found", id)).into())
    }

    pub async fn list_recipes(&self) -> Result<Vec<Recipe>> {
        self.recipes.list_recipes().await
    }

    /// Ingredient names are trimmed; blank names are rejected.
    pub async fn find_or_create_ingredient(&self, name: &str) -> Result<Ingredient> {
        let name = ingredient_name(name)?;
        self.ingredients.find_or_create_ingredient(name).await
    }

    pub async fn find_ingredient(&self, name: &str) -> Result<Option<Ingredient>> {
        let name = ingredient_name(name)?;
        self.ingredients.find_ingredient_by_name(name).await
    }
}

fn ingredient_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::Validation("Ingredient name is required".to_string()).into());
    }
    Ok(name)
}
