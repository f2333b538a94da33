//! Cooking-time estimation from category and step count.

use crate::instructions::count_steps;

/// Base minutes used when the category is not one of [`CATEGORY_BASE_MINUTES`].
pub const DEFAULT_BASE_MINUTES: u32 = 30;

/// Minutes added per instruction step.
pub const MINUTES_PER_STEP: u32 = 5;

/// Base preparation time for each known catalog category.
pub const CATEGORY_BASE_MINUTES: &[(&str, u32)] = &[
    ("Beef", 60),
    ("Breakfast", 15),
    ("Chicken", 45),
    ("Dessert", 40),
    ("Goat", 75),
    ("Lamb", 60),
    ("Miscellaneous", 30),
    ("Pasta", 25),
    ("Pork", 50),
    ("Seafood", 30),
    ("Side", 20),
    ("Starter", 20),
    ("Vegan", 30),
    ("Vegetarian", 30),
];

/// Base minutes for a category, matched case-insensitively.
pub fn base_minutes(category: &str) -> u32 {
    let category = category.trim();
    CATEGORY_BASE_MINUTES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(category))
        .map(|(_, minutes)| *minutes)
        .unwrap_or(DEFAULT_BASE_MINUTES)
}

/// `base + 5 * steps`. Always positive and non-decreasing in `step_count`.
pub fn estimate_cooking_time(category: &str, step_count: usize) -> u32 {
    let steps = u32::try_from(step_count).unwrap_or(u32::MAX);
    base_minutes(category).saturating_add(MINUTES_PER_STEP.saturating_mul(steps))
}

/// Estimate from the raw instruction text, counting the steps it segments into.
pub fn estimate_from_instructions(category: &str, instructions: &str) -> u32 {
    estimate_cooking_time(category, count_steps(instructions))
}
