use crate::domain::error::DomainError;
use crate::domain::models::{Ingredient, NewRecipe, Recipe};
use crate::domain::repository::{
    IngredientRepository, InventoryRepository, RecipeRepository, UserRepository,
};
use crate::domain::user::User;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::FromRow;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, instrument};

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL
);
"#;
const CREATE_INGREDIENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS ingredients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);
"#;
const CREATE_RECIPES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS recipes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    ingredients TEXT NOT NULL,
    instructions TEXT NOT NULL
);
"#;
const CREATE_INVENTORY_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS inventory (
    user_id INTEGER NOT NULL REFERENCES users(id),
    ingredient_id INTEGER NOT NULL REFERENCES ingredients(id),
    PRIMARY KEY (user_id, ingredient_id)
);
"#;

#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
        }
    }
}

#[derive(FromRow)]
struct IngredientRow {
    id: i64,
    name: String,
}

impl From<IngredientRow> for Ingredient {
    fn from(row: IngredientRow) -> Self {
        Ingredient {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(FromRow)]
struct RecipeRow {
    id: i64,
    name: String,
    ingredients: String,
    instructions: String,
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Recipe {
            id: row.id,
            name: row.name,
            ingredients: row.ingredients,
            instructions: row.instructions,
        }
    }
}

/// SQLite-backed store. Uniqueness of usernames, ingredient names and
/// inventory pairs is enforced by the schema.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `url` and ensures the
    /// schema exists.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid database url {url}"))?
            .create_if_missing(true)
            .foreign_keys(true);

        // Each connection to an in-memory database sees its own empty
        // database, so those are pinned to one long-lived connection.
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open database {url}"))?;

        let store = Self { pool };
        store.migrate().await?;
        info!(url = %url, "SQLite store ready");
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        for statement in [
            CREATE_USERS_TABLE,
            CREATE_INGREDIENTS_TABLE,
            CREATE_RECIPES_TABLE,
            CREATE_INVENTORY_TABLE,
        ] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("failed to create schema")?;
        }
        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

#[async_trait]
impl UserRepository for SqliteStore {
    #[instrument(skip(self, password_hash))]
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (username, password_hash) VALUES (?, ?) \
             RETURNING id, username, password_hash",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                anyhow::Error::from(DomainError::Conflict(format!(
                    "username {username} is taken"
                )))
            } else {
                anyhow::Error::from(e).context("failed to insert user")
            }
        })?;
        debug!(user_id = row.id, "User inserted");
        Ok(row.into())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("failed to query user by username")?;
        Ok(row.map(User::from))
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to query user by id")?;
        Ok(row.map(User::from))
    }
}

#[async_trait]
impl RecipeRepository for SqliteStore {
    #[instrument(skip(self, recipe), fields(name = %recipe.name))]
    async fn add_recipe(&self, recipe: NewRecipe) -> Result<Recipe> {
        let row = sqlx::query_as::<_, RecipeRow>(
            "INSERT INTO recipes (name, ingredients, instructions) VALUES (?, ?, ?) \
             RETURNING id, name, ingredients, instructions",
        )
        .bind(&recipe.name)
        .bind(&recipe.ingredients)
        .bind(&recipe.instructions)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert recipe")?;
        debug!(recipe_id = row.id, "Recipe inserted");
        Ok(row.into())
    }

    async fn find_recipe(&self, id: i64) -> Result<Option<Recipe>> {
        let row = sqlx::query_as::<_, RecipeRow>(
            "SELECT id, name, ingredients, instructions FROM recipes WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to query recipe")?;
        Ok(row.map(Recipe::from))
    }

    async fn list_recipes(&self) -> Result<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, RecipeRow>(
            "SELECT id, name, ingredients, instructions FROM recipes ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list recipes")?;
        Ok(rows.into_iter().map(Recipe::from).collect())
    }
}

#[async_trait]
impl IngredientRepository for SqliteStore {
    #[instrument(skip(self))]
    async fn find_or_create_ingredient(&self, name: &str) -> Result<Ingredient> {
        // The unique index on name makes a racing insert a no-op; both
        // callers then read back the same row.
        sqlx::query("INSERT INTO ingredients (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
            .bind(name)
            .execute(&self.pool)
            .await
            .context("failed to insert ingredient")?;
        let row = sqlx::query_as::<_, IngredientRow>(
            "SELECT id, name FROM ingredients WHERE name = ?",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .context("failed to read back ingredient")?;
        Ok(row.into())
    }

    async fn find_ingredient_by_name(&self, name: &str) -> Result<Option<Ingredient>> {
        let row = sqlx::query_as::<_, IngredientRow>(
            "SELECT id, name FROM ingredients WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("failed to query ingredient")?;
        Ok(row.map(Ingredient::from))
    }
}

#[async_trait]
impl InventoryRepository for SqliteStore {
    #[instrument(skip(self))]
    async fn add_entry(&self, user_id: i64, ingredient_id: i64) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO inventory (user_id, ingredient_id) VALUES (?, ?) \
             ON CONFLICT(user_id, ingredient_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(ingredient_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                anyhow::Error::from(DomainError::NotFound(format!(
                    "user {user_id} or ingredient {ingredient_id}"
                )))
            } else {
                anyhow::Error::from(e).context("failed to insert inventory entry")
            }
        })?;
        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn remove_entries(&self, user_id: i64, ingredient_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM inventory WHERE user_id = ? AND ingredient_id = ?")
            .bind(user_id)
            .bind(ingredient_id)
            .execute(&self.pool)
            .await
            .context("failed to delete inventory entries")?;
        Ok(result.rows_affected())
    }

    async fn list_ingredient_names(&self, user_id: i64) -> Result<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT ingredients.name FROM inventory \
             JOIN ingredients ON ingredients.id = inventory.ingredient_id \
             WHERE inventory.user_id = ? ORDER BY ingredients.name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to list inventory")?;
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_schema_is_reentrant() {
        let store = store().await;
        store.migrate().await.unwrap();
    }

    #[tokio::test]
    async fn test_users_round_trip_and_unique_username() {
        let store = store().await;
        let user = store.create_user("alice", "hash").await.unwrap();
        let found = store.find_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found, user);
        assert_eq!(
            store.find_user_by_id(user.id).await.unwrap().unwrap().username,
            "alice"
        );

        let err = store.create_user("alice", "other").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_recipes_persist_in_order() {
        let store = store().await;
        let first = store
            .add_recipe(NewRecipe {
                name: "Pancakes".to_string(),
                ingredients: "Egg, Milk, Flour".to_string(),
                instructions: "Whisk and fry".to_string(),
            })
            .await
            .unwrap();
        store
            .add_recipe(NewRecipe {
                name: "Toast".to_string(),
                ingredients: "Bread".to_string(),
                instructions: "Toast it".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(store.find_recipe(first.id).await.unwrap().unwrap(), first);
        assert!(store.find_recipe(999).await.unwrap().is_none());
        let names: Vec<_> = store
            .list_recipes()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Pancakes", "Toast"]);
    }

    #[tokio::test]
    async fn test_find_or_create_ingredient_dedupes_by_name() {
        let store = store().await;
        let a = store.find_or_create_ingredient("Egg").await.unwrap();
        let b = store.find_or_create_ingredient("Egg").await.unwrap();
        assert_eq!(a, b);
        assert!(store.find_ingredient_by_name("egg").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_inventory_pair_is_unique() {
        let store = store().await;
        let user = store.create_user("alice", "hash").await.unwrap();
        let egg = store.find_or_create_ingredient("Egg").await.unwrap();

        assert!(store.add_entry(user.id, egg.id).await.unwrap());
        assert!(!store.add_entry(user.id, egg.id).await.unwrap());
        assert_eq!(
            store.list_ingredient_names(user.id).await.unwrap(),
            vec!["Egg"]
        );

        assert_eq!(store.remove_entries(user.id, egg.id).await.unwrap(), 1);
        assert!(store.list_ingredient_names(user.id).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_find_or_create_and_add_converge_on_file_db() {
        let path = std::env::temp_dir().join(format!("pantry-{}.db", uuid::Uuid::new_v4()));
        let url = format!("sqlite://{}", path.display());
        let store = SqliteStore::connect(&url).await.unwrap();
        let user_id = store.create_user("alice", "hash").await.unwrap().id;

        let handles: Vec<_> = (0..40)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    let basil = store.find_or_create_ingredient("Basil").await.unwrap();
                    let inserted = store.add_entry(user_id, basil.id).await.unwrap();
                    (basil.id, inserted)
                })
            })
            .collect();

        let mut ids = Vec::new();
        let mut inserts = 0;
        for handle in handles {
            let (id, inserted) = handle.await.unwrap();
            ids.push(id);
            inserts += usize::from(inserted);
        }
        ids.sort();
        ids.dedup();

        assert_eq!(ids.len(), 1);
        assert_eq!(inserts, 1);
        assert_eq!(
            store.list_ingredient_names(user_id).await.unwrap(),
            vec!["Basil"]
        );

        store.pool.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[tokio::test]
    async fn test_inventory_rejects_unknown_user() {
        let store = store().await;
        let egg = store.find_or_create_ingredient("Egg").await.unwrap();
        let err = store.add_entry(42, egg.id).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::NotFound(_))
        ));
    }
}
