use crate::data::memory::InMemoryStore;
use crate::data::sqlite::SqliteStore;
use crate::domain::repository::{
    IngredientRepository, InventoryRepository, RecipeRepository, UserRepository,
};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// The four stores the services depend on, backed by a single backend.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserRepository>,
    pub recipes: Arc<dyn RecipeRepository>,
    pub ingredients: Arc<dyn IngredientRepository>,
    pub inventory: Arc<dyn InventoryRepository>,
}

impl Stores {
    pub fn from_backend<B>(backend: B) -> Self
    where
        B: UserRepository + RecipeRepository + IngredientRepository + InventoryRepository + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            users: backend.clone(),
            recipes: backend.clone(),
            ingredients: backend.clone(),
            inventory: backend,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_backend(InMemoryStore::new())
    }
}

pub async fn open_stores(database_url: Option<&str>) -> Result<Stores> {
    match database_url {
        Some(url) => Ok(Stores::from_backend(SqliteStore::connect(url).await?)),
        None => {
            info!("Creating in-memory store");
            Ok(Stores::in_memory())
        }
    }
}
