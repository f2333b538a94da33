//! Recipe extraction from free-form chat replies.
//!
//! Assistant replies are unstructured text. Each concern (title, ingredient
//! section, instruction section, time, difficulty) is located by its own small
//! regex-driven function so they can be tested in isolation. A reply only counts
//! as a recipe when both an ingredient list and an instruction list come out
//! non-empty.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::ingredient_parser::normalize_ingredient_lines;
use crate::instructions::segment_lines;
use crate::nutrition::estimate_nutrition;
use crate::types::{Difficulty, Recipe, DEFAULT_SERVINGS};

pub const DEFAULT_CHAT_COOKING_MINUTES: u32 = 30;
pub const DEFAULT_CHAT_DIFFICULTY: Difficulty = Difficulty::Medium;
const CHAT_CUISINE: &str = "Unknown";
const CHAT_CATEGORY: &str = "Miscellaneous";

/// "Ingredients" as a heading at the start of a line, with optional markdown
/// decoration. A qualifier such as "for the sauce" or "(serves 4)" is part of
/// the heading when the line carries a colon.
static INGREDIENTS_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^[ \t#*_>-]*ingredients\b(?:[^\n:]*:[ \t]*[*_#]*|[ \t]*(?:\([^)\n]*\))?[ \t]*[*_#]*)",
    )
    .expect("Invalid ingredients heading regex")
});

/// A nested heading inside the ingredients section, e.g. "For the filling:".
static INGREDIENTS_SUBHEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[ \t#*_>-]*(?:ingredients\b|for\s+the\b)[^\n:]*:[ \t*_#]*$")
        .expect("Invalid ingredients subheading regex")
});

/// A bullet or numbered list marker at the start of a line.
static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[-*•+]|\d+[.)])\s").expect("Invalid list marker regex")
});

/// "ingredients" anywhere, used when no heading form exists.
static INGREDIENTS_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bingredients\b[ \t]*[*:_]*").expect("Invalid ingredients regex")
});

static INSTRUCTIONS_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t#*_>-]*(?:instructions|directions|method|steps)\b[ \t]*[*:_#]*")
        .expect("Invalid instructions heading regex")
});

static INSTRUCTIONS_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:instructions|directions)\b[ \t]*[*:_]*")
        .expect("Invalid instructions regex")
});

/// Lines that end the instruction section.
static INSTRUCTIONS_STOP_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^[ \t#*_>-]*(?:(?:cooking|cook|prep|total)\s+time|difficulty|servings|serves|nutrition|notes?|tips?)\b",
    )
    .expect("Invalid instructions stop regex")
});

static INSTRUCTIONS_STOP_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:cooking time|difficulty)\b").expect("Invalid instructions stop regex")
});

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*\n]+?)\*\*").expect("Invalid bold regex"));

/// Time phrases, most specific first.
static TIME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(?:total|cooking|cook)\s+time\s*\**\s*:\s*\**\s*(\d+)\s*(hours?|hrs?|minutes?|mins?)\b",
        r"(?i)\btime\s*\**\s*:\s*\**\s*(\d+)\s*(hours?|hrs?|minutes?|mins?)\b",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid time regex"))
    .collect()
});

static DIFFICULTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bdifficulty\s*\**\s*:\s*\**\s*(easy|medium|hard)\b")
        .expect("Invalid difficulty regex")
});

static SECTION_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:ingredients|instructions|directions|method|steps?|time|difficulty|servings|serves|notes?|tips?|nutrition)\b",
    )
    .expect("Invalid section label regex")
});

/// Byte ranges of the located sections, for reuse across extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SectionBounds {
    /// Start of the "ingredients" heading
    ingredients_heading: Option<usize>,
    ingredients: Option<(usize, usize)>,
    instructions: Option<(usize, usize)>,
}

fn locate_sections(text: &str) -> SectionBounds {
    let (ingredients_match, ingredients_inline) = match INGREDIENTS_HEADING.find(text) {
        Some(m) => (Some(m), false),
        None => (INGREDIENTS_WORD.find(text), true),
    };

    let search_from = ingredients_match.map(|m| m.end()).unwrap_or(0);
    let (instructions_match, instructions_inline) =
        match INSTRUCTIONS_HEADING.find_at(text, search_from) {
            Some(m) => (Some(m), false),
            None => (INSTRUCTIONS_WORD.find_at(text, search_from), true),
        };

    let ingredients = ingredients_match.map(|m| {
        let end = instructions_match.map(|i| i.start()).unwrap_or(text.len());
        (m.end(), end.max(m.end()))
    });

    let instructions = instructions_match.map(|m| {
        let end = INSTRUCTIONS_STOP_LINE
            .find_at(text, m.end())
            .or_else(|| INSTRUCTIONS_STOP_WORD.find_at(text, m.end()))
            .map(|stop| stop.start())
            .unwrap_or(text.len());
        (m.end(), end)
    });

    // A section found only by a word inside prose must still look like a list.
    let ingredients = ingredients
        .filter(|&(start, end)| !ingredients_inline || looks_like_list(&text[start..end]));
    let instructions = instructions
        .filter(|&(start, end)| !instructions_inline || looks_like_list(&text[start..end]));

    SectionBounds {
        ingredients_heading: ingredients.and(ingredients_match.map(|m| m.start())),
        ingredients,
        instructions,
    }
}

fn looks_like_list(section: &str) -> bool {
    let lines = section_lines(section);
    lines.len() >= 2 || lines.iter().any(|line| LIST_MARKER.is_match(line))
}

/// Lines of the ingredients section, markdown stripped, blanks dropped.
///
/// Nested "For the sauce:" headings are dropped. A section that is a single
/// comma-separated line without a list marker is an inline list and is split
/// on commas.
pub fn extract_ingredient_lines(text: &str) -> Vec<String> {
    let Some((start, end)) = locate_sections(text).ingredients else {
        return Vec::new();
    };
    let section = text[start..end]
        .lines()
        .filter(|line| !INGREDIENTS_SUBHEADING.is_match(line))
        .collect::<Vec<_>>()
        .join("\n");
    let lines = section_lines(&section);
    match lines.as_slice() {
        [only] if only.contains(',') && !LIST_MARKER.is_match(only) => only
            .split(',')
            .map(|part| part.trim().trim_start_matches("and ").trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        _ => lines,
    }
}

/// Lines of the instructions section, markdown stripped, blanks dropped.
pub fn extract_instruction_lines(text: &str) -> Vec<String> {
    match locate_sections(text).instructions {
        Some((start, end)) => section_lines(&text[start..end]),
        None => Vec::new(),
    }
}

fn section_lines(section: &str) -> Vec<String> {
    section
        .lines()
        .map(|line| {
            line.replace("**", "")
                .trim()
                .trim_matches(|c: char| c == '#' || c == '_' || c == ':')
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty() && !line.chars().all(|c| c == '*' || c == '-'))
        .collect()
}

/// Recover a title: bold text that is not a section label, else the line just
/// before the ingredients heading, else the first non-empty line.
pub fn extract_title(text: &str) -> Option<String> {
    let from_bold = BOLD
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| clean_title(m.as_str()))
        .find(|candidate| !candidate.is_empty() && !SECTION_LABEL.is_match(candidate));
    if from_bold.is_some() {
        return from_bold;
    }

    let before_ingredients = locate_sections(text)
        .ingredients_heading
        .and_then(|start| text[..start].lines().rev().map(clean_title).find(|l| !l.is_empty()));
    if before_ingredients.is_some() {
        return before_ingredients;
    }

    text.lines()
        .map(clean_title)
        .find(|line| !line.is_empty())
}

fn clean_title(line: &str) -> String {
    let line = line
        .replace("**", "")
        .trim()
        .trim_matches(|c: char| c == '#' || c == '_' || c == ':' || c == '*')
        .trim()
        .to_string();
    let lower = line.to_lowercase();
    for prefix in ["recipe:", "recipe for "] {
        if lower.starts_with(prefix) {
            if let Some(rest) = line.get(prefix.len()..) {
                return rest.trim().to_string();
            }
        }
    }
    line
}

/// Minutes from a "time: N minutes" phrase, if any.
pub fn extract_cooking_time(text: &str) -> Option<u32> {
    TIME_PATTERNS.iter().find_map(|pattern| {
        let caps = pattern.captures(text)?;
        let value: u32 = caps.get(1)?.as_str().parse().ok()?;
        let unit = caps.get(2)?.as_str().to_lowercase();
        let minutes = if unit.starts_with('h') {
            value.saturating_mul(60)
        } else {
            value
        };
        (minutes > 0).then_some(minutes)
    })
}

/// Tier from a "difficulty: easy|medium|hard" phrase, if any.
pub fn extract_difficulty(text: &str) -> Option<Difficulty> {
    DIFFICULTY
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| Difficulty::parse(m.as_str()))
}

fn extract_description(text: &str, title: &str) -> String {
    let Some(start) = locate_sections(text).ingredients_heading else {
        return String::new();
    };
    text[..start]
        .lines()
        .map(clean_title)
        .filter(|line| !line.is_empty() && line != title)
        .collect::<Vec<_>>()
        .join(" ")
}

/// True when the reply holds both an ingredient list and an instruction list.
pub fn contains_recipe(text: &str) -> bool {
    !extract_ingredient_lines(text).is_empty() && !extract_instruction_lines(text).is_empty()
}

/// Id for a recipe extracted from a chat message sent at `sent_at`.
pub fn chat_recipe_id(sent_at: DateTime<Utc>) -> String {
    format!("chat-{}", sent_at.timestamp_millis())
}

/// Extract a canonical recipe from one assistant reply.
///
/// Returns `None` when no recipe is recognized; that is an expected outcome,
/// not an error.
pub fn extract_chat_recipe(text: &str, recipe_id: &str) -> Option<Recipe> {
    let ingredient_lines = extract_ingredient_lines(text);
    let ingredients = normalize_ingredient_lines(ingredient_lines.iter().map(String::as_str));
    let instruction_lines = extract_instruction_lines(text);
    let instructions = segment_lines(instruction_lines.iter().map(String::as_str));

    if ingredients.is_empty() || instructions.is_empty() {
        tracing::debug!(
            ingredients = ingredients.len(),
            instructions = instructions.len(),
            "no recipe recognized in chat reply"
        );
        return None;
    }

    let title = extract_title(text).unwrap_or_else(|| "Untitled recipe".to_string());
    let description = extract_description(text, &title);
    let nutrition = estimate_nutrition(ingredients.iter().map(|i| i.name.as_str()));

    Some(Recipe {
        id: recipe_id.to_string(),
        title,
        description,
        image_url: None,
        cooking_time_minutes: extract_cooking_time(text).unwrap_or(DEFAULT_CHAT_COOKING_MINUTES),
        servings: DEFAULT_SERVINGS,
        cuisine: CHAT_CUISINE.to_string(),
        category: CHAT_CATEGORY.to_string(),
        difficulty: extract_difficulty(text).unwrap_or(DEFAULT_CHAT_DIFFICULTY),
        nutrition,
        ingredients,
        instructions,
        tags: Vec::new(),
        source_url: None,
    })
}
