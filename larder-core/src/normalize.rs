//! Catalog record to canonical recipe.

use crate::catalog::{non_empty, MealRecord};
use crate::difficulty::classify;
use crate::ingredient_parser::normalize_ingredients;
use crate::instructions::segment_instructions;
use crate::nutrition::estimate_nutrition;
use crate::timing::estimate_from_instructions;
use crate::types::{Recipe, DEFAULT_SERVINGS};

pub const UNKNOWN_CUISINE: &str = "Unknown";
pub const DEFAULT_CATEGORY: &str = "Miscellaneous";

/// Derive a canonical recipe from a full catalog record.
///
/// Returns `None` for records without an id or a title; everything else
/// falls back to defaults.
pub fn normalize_record(record: &MealRecord) -> Option<Recipe> {
    let id = record.id.trim();
    if id.is_empty() {
        return None;
    }
    let title = non_empty(&record.name)?;

    let category = non_empty(&record.category).unwrap_or(DEFAULT_CATEGORY);
    let cuisine = non_empty(&record.area).unwrap_or(UNKNOWN_CUISINE);
    let instruction_text = record.instructions.as_deref().unwrap_or_default();

    let ingredients = normalize_ingredients(&record.raw_ingredients());
    let instructions = segment_instructions(instruction_text);
    let cooking_time_minutes = estimate_from_instructions(category, instruction_text);
    let difficulty = classify(cooking_time_minutes, ingredients.len());
    let nutrition = estimate_nutrition(ingredients.iter().map(|i| i.name.as_str()));

    Some(Recipe {
        id: id.to_string(),
        title: title.to_string(),
        description: describe(cuisine, category),
        image_url: non_empty(&record.thumbnail).map(str::to_string),
        cooking_time_minutes,
        servings: DEFAULT_SERVINGS,
        cuisine: cuisine.to_string(),
        category: category.to_string(),
        difficulty,
        nutrition,
        ingredients,
        instructions,
        tags: record.tag_list(),
        source_url: non_empty(&record.source).map(str::to_string),
    })
}

fn describe(cuisine: &str, category: &str) -> String {
    if cuisine == UNKNOWN_CUISINE {
        format!("{} recipe", category)
    } else {
        format!("{} {} recipe", cuisine, category.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Difficulty;
    use serde_json::json;

    fn teriyaki() -> MealRecord {
        serde_json::from_value(json!({
            "idMeal": "52772",
            "strMeal": "Teriyaki Chicken Casserole",
            "strCategory": "Chicken",
            "strArea": "Japanese",
            "strInstructions": "Preheat oven to 350F.\r\nCombine soy sauce, water and sugar.\r\nBake for 35 minutes.",
            "strMealThumb": "https://example.com/teriyaki.jpg",
            "strTags": "Meat,Casserole",
            "strSource": "",
            "strIngredient1": "soy sauce",
            "strMeasure1": "3/4 cup",
            "strIngredient2": "water",
            "strMeasure2": "1/2 cup",
            "strIngredient3": "chicken breasts",
            "strMeasure3": "2",
            "strIngredient4": "",
            "strMeasure4": "",
        }))
        .unwrap()
    }

    #[test]
    fn test_normalizes_full_record() {
        let recipe = normalize_record(&teriyaki()).unwrap();
        assert_eq!(recipe.id, "52772");
        assert_eq!(recipe.title, "Teriyaki Chicken Casserole");
        assert_eq!(recipe.description, "Japanese chicken recipe");
        assert_eq!(recipe.cuisine, "Japanese");
        assert_eq!(recipe.category, "Chicken");
        // chicken base 45 + 3 steps * 5
        assert_eq!(recipe.cooking_time_minutes, 60);
        assert_eq!(recipe.difficulty, Difficulty::Medium);
        assert_eq!(recipe.servings, DEFAULT_SERVINGS);
        assert_eq!(recipe.ingredients.len(), 3);
        assert_eq!(recipe.ingredients[0].amount, 0.75);
        assert_eq!(recipe.ingredients[0].unit, "cup");
        assert_eq!(recipe.ingredients[2].unit, "piece");
        assert_eq!(recipe.instructions.len(), 3);
        assert_eq!(recipe.instructions[2].duration_minutes, Some(35));
        assert_eq!(recipe.tags, vec!["Meat", "Casserole"]);
        assert_eq!(recipe.source_url, None);
        assert_eq!(
            recipe.image_url.as_deref(),
            Some("https://example.com/teriyaki.jpg")
        );
    }

    #[test]
    fn test_missing_title_or_id_is_skipped() {
        let mut record = teriyaki();
        record.name = Some("  ".to_string());
        assert!(normalize_record(&record).is_none());

        let mut record = teriyaki();
        record.id = String::new();
        assert!(normalize_record(&record).is_none());
    }

    #[test]
    fn test_sparse_record_uses_defaults() {
        let record = MealRecord {
            id: "1".to_string(),
            name: Some("Toast".to_string()),
            ..Default::default()
        };
        let recipe = normalize_record(&record).unwrap();
        assert_eq!(recipe.cuisine, UNKNOWN_CUISINE);
        assert_eq!(recipe.category, DEFAULT_CATEGORY);
        assert_eq!(recipe.description, "Miscellaneous recipe");
        assert_eq!(recipe.cooking_time_minutes, 30);
        assert_eq!(recipe.difficulty, Difficulty::Easy);
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.instructions.is_empty());
    }
}
