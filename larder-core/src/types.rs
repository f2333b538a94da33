use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Servings every derived recipe is assumed to make.
/// Nutrition estimates are divided by this.
pub const DEFAULT_SERVINGS: u32 = 4;

/// One ingredient as it arrives from a source, before parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIngredient {
    pub name: String,
    /// Measure text ("1 1/2 cups", "pinch", "") or a stringified number
    pub amount_raw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Canonical ingredient.
///
/// `amount` is always finite and positive, `unit` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: u32,
    pub name: String,
    pub amount: f64,
    pub unit: String,
}

/// Canonical instruction step. A step with a duration always requires a timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instruction {
    /// 1-based position in the recipe
    pub id: u32,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    pub timer_required: bool,
}

/// Per-serving macro estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionEstimate {
    pub calories_kcal: u32,
    pub protein_g: u32,
    pub carbs_g: u32,
    pub fat_g: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: &'static [Difficulty] = &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Case-insensitive parse of a tier name. Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The normalized recipe every source is converted into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub cooking_time_minutes: u32,
    pub servings: u32,
    pub cuisine: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub nutrition: NutritionEstimate,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<Instruction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

/// Inclusive cooking-time window in minutes. `min <= max` always holds,
/// including for deserialized values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTimeRange")]
pub struct TimeRange {
    min: u32,
    max: u32,
}

#[derive(Deserialize)]
struct RawTimeRange {
    min: u32,
    max: u32,
}

impl From<RawTimeRange> for TimeRange {
    fn from(raw: RawTimeRange) -> Self {
        TimeRange::new(raw.min, raw.max)
    }
}

impl TimeRange {
    /// Build a range, swapping the bounds if they arrive reversed.
    pub fn new(min: u32, max: u32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn contains(&self, minutes: u32) -> bool {
        (self.min..=self.max).contains(&minutes)
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self {
            min: 0,
            max: u32::MAX,
        }
    }
}

/// User-supplied filters applied after normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    pub cooking_time: TimeRange,
    /// Empty means every tier is accepted.
    pub complexity: BTreeSet<Difficulty>,
}

impl SearchFilters {
    pub fn matches(&self, recipe: &Recipe) -> bool {
        self.cooking_time.contains(recipe.cooking_time_minutes)
            && (self.complexity.is_empty() || self.complexity.contains(&recipe.difficulty))
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub results: Vec<T>,
    pub total_results: usize,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
