use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use larder_core::{chat_recipe_id, extract_chat_recipe};

use crate::parse::read_input;

/// Extract a recipe from a chat reply.
/// Outputs the recipe as JSON, or `{"recipeDetected": false}` when the reply holds none.
pub fn extract(file: Option<&Path>, sent_at: DateTime<Utc>) -> Result<()> {
    let text = read_input(file)?;

    match extract_chat_recipe(&text, &chat_recipe_id(sent_at)) {
        Some(recipe) => println!("{}", serde_json::to_string_pretty(&recipe)?),
        None => {
            let none = serde_json::json!({ "recipeDetected": false });
            println!("{}", serde_json::to_string_pretty(&none)?);
        }
    }
    Ok(())
}
