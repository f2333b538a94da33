//! Heuristic nutrition estimation.
//!
//! Maps ingredient names to a coarse food category by keyword matching and sums
//! a fixed per-category macro tuple. Amounts are ignored: every ingredient counts
//! as one average portion. The total is divided by [`DEFAULT_SERVINGS`].

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{NutritionEstimate, DEFAULT_SERVINGS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    Meat,
    Fish,
    Vegetable,
    Fruit,
    Grain,
    Dairy,
    Spice,
    Oil,
    Other,
}

/// Calories, protein, carbs and fat for one portion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Macros {
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

impl FoodCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoodCategory::Meat => "meat",
            FoodCategory::Fish => "fish",
            FoodCategory::Vegetable => "vegetable",
            FoodCategory::Fruit => "fruit",
            FoodCategory::Grain => "grain",
            FoodCategory::Dairy => "dairy",
            FoodCategory::Spice => "spice",
            FoodCategory::Oil => "oil",
            FoodCategory::Other => "other",
        }
    }

    /// Fixed macro tuple per 100g-equivalent portion.
    pub fn macros(&self) -> Macros {
        let (calories, protein, carbs, fat) = match self {
            FoodCategory::Meat => (250, 25, 0, 15),
            FoodCategory::Fish => (200, 22, 0, 12),
            FoodCategory::Vegetable => (30, 2, 6, 0),
            FoodCategory::Fruit => (60, 1, 15, 0),
            FoodCategory::Grain => (350, 10, 70, 2),
            FoodCategory::Dairy => (150, 8, 5, 10),
            FoodCategory::Spice => (0, 0, 0, 0),
            FoodCategory::Oil => (900, 0, 0, 100),
            FoodCategory::Other => (100, 3, 10, 5),
        };
        Macros {
            calories,
            protein,
            carbs,
            fat,
        }
    }
}

/// Keyword patterns in priority order; the first match wins.
/// Oil and spice come first so "olive oil" is not fruit and "black pepper"
/// is not a vegetable.
static CATEGORY_PATTERNS: LazyLock<Vec<(FoodCategory, Regex)>> = LazyLock::new(|| {
    [
        (
            FoodCategory::Oil,
            r"\boil\b|\bghee\b|\blard\b|\bshortening\b|\bdripping",
        ),
        (
            FoodCategory::Spice,
            r"\bsalt\b|black pepper|white pepper|peppercorn|cumin|paprika|turmeric|cinnamon|nutmeg|oregano|thyme|basil|rosemary|parsley|coriander|cilantro|chili powder|chilli powder|cayenne|clove|cardamom|bay lea|garam masala|curry powder|\bspice|\bherb|vanilla|saffron|ginger powder|mustard seed",
        ),
        (
            FoodCategory::Meat,
            r"chicken|beef|pork|lamb|mutton|goat|veal|bacon|\bham\b|sausage|\bmince\b|turkey|duck|chorizo|pancetta|prosciutto|salami|steak|brisket|\bribs?\b",
        ),
        (
            FoodCategory::Fish,
            r"fish|salmon|tuna|\bcod\b|haddock|mackerel|sardine|anchov|prawn|shrimp|crab|lobster|mussel|clam|oyster|squid|scallop|tilapia|trout|seafood",
        ),
        (
            FoodCategory::Dairy,
            r"milk|cream|cheese|\bbutter\b|yogh?urt|\beggs?\b|parmesan|mozzarella|cheddar|feta|ricotta|mascarpone|cr[eè]me fra[iî]che",
        ),
        (
            FoodCategory::Grain,
            r"flour|rice|pasta|spaghetti|penne|noodle|bread|\boats?\b|oatmeal|barley|quinoa|couscous|tortilla|macaroni|lasagne|breadcrumb|semolina|polenta|cornmeal|\bbuns?\b",
        ),
        (
            FoodCategory::Vegetable,
            r"onion|garlic|tomato|potato|carrot|celery|pepper|spinach|lettuce|cabbage|broccoli|cauliflower|courgette|zucchini|aubergine|eggplant|mushroom|\bpeas?\b|beans?|lentil|chickpea|leek|kale|cucumber|shallot|squash|pumpkin|corn\b|sweetcorn|asparagus|beetroot|\bchill?i(?:es)?\b|scallion|spring onion",
        ),
        (
            FoodCategory::Fruit,
            r"apple|banana|lemon|lime|orange|berr|mango|pineapple|peach|pear\b|pears\b|grape|cherr|plum|apricot|raisin|sultana|\bdates?\b|\bfigs?\b|coconut|avocado|olive|melon|kiwi|rhubarb",
        ),
    ]
    .into_iter()
    .map(|(category, pattern)| {
        (
            category,
            Regex::new(pattern).expect("Invalid food category regex"),
        )
    })
    .collect()
});

/// Categorize an ingredient by name.
///
/// Only the part before the first comma is considered, so preparation notes
/// like "garlic, minced" do not count. Matching is case-insensitive. Returns
/// [`FoodCategory::Other`] when nothing matches.
pub fn categorize(name: &str) -> FoodCategory {
    let head = name.split(',').next().unwrap_or(name);
    let lower = head.to_lowercase();

    CATEGORY_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(&lower))
        .map(|(category, _)| *category)
        .unwrap_or(FoodCategory::Other)
}

/// Estimate per-serving nutrition for a list of ingredient names.
pub fn estimate_nutrition<I, S>(names: I) -> NutritionEstimate
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let (calories, protein, carbs, fat) =
        names
            .into_iter()
            .fold((0u64, 0u64, 0u64, 0u64), |(cal, pro, carb, fat), name| {
                let m = categorize(name.as_ref()).macros();
                (
                    cal + u64::from(m.calories),
                    pro + u64::from(m.protein),
                    carb + u64::from(m.carbs),
                    fat + u64::from(m.fat),
                )
            });

    NutritionEstimate {
        calories_kcal: per_serving(calories),
        protein_g: per_serving(protein),
        carbs_g: per_serving(carbs),
        fat_g: per_serving(fat),
    }
}

fn per_serving(total: u64) -> u32 {
    let rounded = (total as f64 / f64::from(DEFAULT_SERVINGS)).round();
    u32::try_from(rounded as u64).unwrap_or(u32::MAX)
}
