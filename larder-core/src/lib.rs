pub mod catalog;
pub mod chat_extract;
pub mod config;
pub mod difficulty;
pub mod error;
pub mod ingredient_parser;
pub mod instructions;
pub mod normalize;
pub mod nutrition;
pub mod retrieval;
pub mod timing;
pub mod types;

pub use catalog::{Catalog, CatalogClientBuilder, HttpCatalog, MealPreview, MealRecord, MockCatalog};
pub use chat_extract::{chat_recipe_id, contains_recipe, extract_chat_recipe};
pub use config::RetrievalConfig;
pub use error::{CatalogError, RetrievalError};
pub use ingredient_parser::{parse_ingredient_line, parse_measured, ParsedIngredient};
pub use instructions::{detect_timer, segment_instructions, TimerInfo};
pub use normalize::normalize_record;
pub use retrieval::{RecipeOrchestrator, RecipeQuery, RecipeRequest, RetrievalMode};
pub use types::{
    Difficulty, Ingredient, Instruction, NutritionEstimate, Page, RawIngredient, Recipe,
    SearchFilters, TimeRange,
};
