use crate::application::catalog_service::CatalogService;
use crate::domain::matcher::missing_ingredients;
use crate::domain::models::{InventoryAction, RecipeMatch};
use crate::domain::repository::InventoryRepository;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub struct InventoryService {
    catalog: Arc<CatalogService>,
    inventory: Arc<dyn InventoryRepository>,
}

impl InventoryService {
    pub fn new(catalog: Arc<CatalogService>, inventory: Arc<dyn InventoryRepository>) -> Self {
        Self { catalog, inventory }
    }

    /// Records that the user owns `name`. Adding an ingredient twice is a
    /// no-op.
    #[instrument(skip(self))]
    pub async fn add(&self, user_id: i64, name: &str) -> Result<()> {
        let ingredient = self.catalog.find_or_create_ingredient(name).await?;
        let inserted = self.inventory.add_entry(user_id, ingredient.id).await?;
        info!(ingredient_id = ingredient.id, inserted, "Ingredient added to inventory");
        Ok(())
    }

    /// Unknown ingredients and entries the user does not hold are ignored.
    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: i64, name: &str) -> Result<()> {
        let Some(ingredient) = self.catalog.find_ingredient(name).await? else {
            debug!("Ingredient unknown, nothing to remove");
            return Ok(());
        };
        let removed = self.inventory.remove_entries(user_id, ingredient.id).await?;
        info!(ingredient_id = ingredient.id, removed, "Ingredient removed from inventory");
        Ok(())
    }

    pub async fn apply(&self, user_id: i64, name: &str, action: InventoryAction) -> Result<()> {
        match action {
            InventoryAction::Add => self.add(user_id, name).await,
            InventoryAction::Remove => self.remove(user_id, name).await,
        }
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<String>> {
        self.inventory.list_ingredient_names(user_id).await
    }

    /// Every catalog recipe with the ingredients the user still lacks.
    #[instrument(skip(self))]
    pub async fn my_recipes(&self, user_id: i64) -> Result<Vec<RecipeMatch>> {
        let owned = self.list(user_id).await?;
        let recipes = self.catalog.list_recipes().await?;
        Ok(recipes
            .into_iter()
            .map(|recipe| {
                let missing = missing_ingredients(&recipe, &owned);
                RecipeMatch { recipe, missing }
            })
            .collect())
    }
}
