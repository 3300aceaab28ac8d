use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
}

/// A catalog recipe. `ingredients` is free text, comma separated, and is
/// never linked to [`Ingredient`] rows.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub ingredients: String,
    pub instructions: String,
}

/// Payload of the add-recipe form.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewRecipe {
    pub name: String,
    pub ingredients: String,
    pub instructions: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InventoryEntry {
    pub user_id: i64,
    pub ingredient_id: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InventoryAction {
    Add,
    Remove,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InventoryForm {
    pub name: String,
    pub action: InventoryAction,
}

/// One row of the "my recipes" view.
#[derive(Debug, Serialize, Clone)]
pub struct RecipeMatch {
    pub recipe: Recipe,
    pub missing: Vec<String>,
}

impl RecipeMatch {
    pub fn can_make(&self) -> bool {
        self.missing.is_empty()
    }
}
