//! Catalog record shapes.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::ingredient_parser::is_placeholder;
use crate::types::RawIngredient;

/// Number of positional ingredient/measure field pairs a record can carry.
pub const MAX_INGREDIENT_FIELDS: usize = 20;

/// Full catalog record with positional `strIngredientN` / `strMeasureN` fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealRecord {
    #[serde(rename = "idMeal", default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "strMeal", default)]
    pub name: Option<String>,
    #[serde(rename = "strCategory", default)]
    pub category: Option<String>,
    #[serde(rename = "strArea", default)]
    pub area: Option<String>,
    #[serde(rename = "strInstructions", default)]
    pub instructions: Option<String>,
    #[serde(rename = "strMealThumb", default)]
    pub thumbnail: Option<String>,
    #[serde(rename = "strTags", default)]
    pub tags: Option<String>,
    #[serde(rename = "strSource", default)]
    pub source: Option<String>,
    /// Positional ingredient/measure pairs and anything else the catalog sends.
    #[serde(flatten)]
    pub fields: HashMap<String, Value>,
}

/// Entry of a category listing: enough to look the full record up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealPreview {
    #[serde(rename = "idMeal", default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "strMeal", default)]
    pub name: Option<String>,
    #[serde(rename = "strMealThumb", default)]
    pub thumbnail: Option<String>,
}

/// The catalog wraps every response as `{"meals": [...]}`, with `null` for no hits.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct MealsEnvelope<T> {
    #[serde(default)]
    pub meals: Option<Vec<T>>,
}

impl<T> MealsEnvelope<T> {
    pub fn into_meals(self) -> Vec<T> {
        self.meals.unwrap_or_default()
    }
}

impl MealRecord {
    /// Ingredient pairs in positional order, skipping pairs whose name is
    /// missing, blank or a placeholder.
    pub fn raw_ingredients(&self) -> Vec<RawIngredient> {
        (1..=MAX_INGREDIENT_FIELDS)
            .filter_map(|n| {
                let name = self.positional("strIngredient", n)?;
                if is_placeholder(&name) {
                    return None;
                }
                Some(RawIngredient {
                    name,
                    amount_raw: self.positional("strMeasure", n).unwrap_or_default(),
                    unit: None,
                })
            })
            .collect()
    }

    /// Tags from the comma-separated `strTags` field.
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn positional(&self, prefix: &str, n: usize) -> Option<String> {
        match self.fields.get(&format!("{}{}", prefix, n))? {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(num) => Some(num.to_string()),
            _ => None,
        }
    }
}

/// Trimmed, non-empty text of an optional field.
pub(crate) fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}
