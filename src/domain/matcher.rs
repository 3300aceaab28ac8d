//! Recipe/inventory matching.
//!
//! Matching is by normalized name only: each comma-separated token of a
//! recipe's ingredient text is trimmed and lowercased, blank tokens are
//! dropped, and the token counts as missing unless some owned ingredient
//! normalizes to the same string.

use crate::domain::models::Recipe;
use std::collections::HashSet;

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Trimmed, non-blank tokens of a recipe's ingredient text as written.
pub fn ingredient_tokens(ingredients: &str) -> impl Iterator<Item = &str> {
    ingredients
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Normalized ingredient tokens of a recipe, in their written order with
/// duplicates kept.
pub fn required_ingredients(ingredients: &str) -> Vec<String> {
    ingredient_tokens(ingredients).map(normalize).collect()
}

/// Tokens of `recipe` that are not covered by `owned`.
pub fn missing_ingredients<S: AsRef<str>>(recipe: &Recipe, owned: &[S]) -> Vec<String> {
    let owned: HashSet<String> = owned.iter().map(|name| normalize(name.as_ref())).collect();
    required_ingredients(&recipe.ingredients)
        .into_iter()
        .filter(|token| !owned.contains(token))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(ingredients: &str) -> Recipe {
        Recipe {
            id: 1,
            name: "Test".to_string(),
            ingredients: ingredients.to_string(),
            instructions: "Mix".to_string(),
        }
    }

    #[test]
    fn test_missing_reports_unowned_ingredient() {
        let missing = missing_ingredients(&recipe("Egg, Milk, Flour"), &["egg", "flour"]);
        assert_eq!(missing, vec!["milk"]);
    }

    #[test]
    fn test_missing_preserves_duplicates() {
        let owned: [&str; 0] = [];
        let missing = missing_ingredients(&recipe("Sugar,Sugar"), &owned);
        assert_eq!(missing, vec!["sugar", "sugar"]);
    }

    #[test]
    fn test_owned_names_compared_case_insensitively() {
        let missing = missing_ingredients(&recipe("egg, MILK"), &["EGG", "Milk"]);
        assert!(missing.is_empty());
    }

    #[test]
    fn test_owned_names_are_trimmed() {
        let missing = missing_ingredients(&recipe("salt"), &["  Salt "]);
        assert!(missing.is_empty());
    }

    #[test]
    fn test_blank_tokens_are_filtered() {
        assert_eq!(required_ingredients("Egg, , Milk,"), vec!["egg", "milk"]);
        let owned: [&str; 0] = [];
        assert!(missing_ingredients(&recipe(" , ,"), &owned).is_empty());
    }

    #[test]
    fn test_ingredient_tokens_keep_written_case() {
        let tokens: Vec<_> = ingredient_tokens(" Egg ,,Whole Milk, ").collect();
        assert_eq!(tokens, vec!["Egg", "Whole Milk"]);
    }

    #[test]
    fn test_missing_keeps_recipe_order() {
        let missing = missing_ingredients(&recipe("c, a, b, a"), &["b"]);
        assert_eq!(missing, vec!["c", "a", "a"]);
    }

    #[test]
    fn test_never_returns_owned_token() {
        let owned = vec!["Butter".to_string(), "jam".to_string()];
        let missing = missing_ingredients(&recipe("bread, butter, jam, tea"), &owned);
        for name in &owned {
            assert!(!missing.contains(&name.to_lowercase()));
        }
        assert_eq!(missing, vec!["bread", "tea"]);
    }

    #[test]
    fn test_result_independent_of_owned_order() {
        let r = recipe("a, b, c, d");
        let first = missing_ingredients(&r, &["d", "b"]);
        let second = missing_ingredients(&r, &["b", "d"]);
        assert_eq!(first, second);
    }
}
