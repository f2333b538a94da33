//! Ingredient parsing module.
//!
//! Parses a catalog measure/name pair ("1 1/2 cups", "flour") or a free-text
//! line ("- 2 cups flour") into a name, a positive amount and a unit.
//! Parsing never fails: anything unrecognized falls back to an amount of 1
//! and the unit "piece".

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{Ingredient, RawIngredient};

pub const DEFAULT_AMOUNT: f64 = 1.0;
pub const DEFAULT_UNIT: &str = "piece";

/// Parsed ingredient, not yet numbered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParsedIngredient {
    pub name: String,
    pub amount: f64,
    pub unit: String,
}

impl ParsedIngredient {
    /// Empty names and bare "*" placeholders should be dropped by the caller.
    pub fn is_placeholder(&self) -> bool {
        is_placeholder(&self.name)
    }

    pub fn into_ingredient(self, id: u32) -> Ingredient {
        Ingredient {
            id,
            name: self.name,
            amount: self.amount,
            unit: self.unit,
        }
    }
}

/// True for text that carries no ingredient: empty, or only asterisks.
pub fn is_placeholder(name: &str) -> bool {
    let trimmed = name.trim();
    trimmed.is_empty() || trimmed.chars().all(|c| c == '*')
}

/// Bullets ("-", "•", "*") or list numbering ("1.", "2)") at the start of a line.
/// Numbering needs trailing whitespace so "1.5 cups" is left alone.
static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[-•·*+]+\s*|\d+[.)]\s+)").expect("Invalid list marker regex")
});

/// Leading amount: mixed number, fraction, decimal or integer, then the rest.
static AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<amount>\d+\s+\d+\s*/\s*\d+|\d+\s*/\s*\d+|\d*\.\d+|\d+)\s*(?P<rest>.*)$")
        .expect("Invalid amount regex")
});

/// Unit vocabulary, sorted by length at runtime (longest first) to avoid
/// partial matches ("tablespoons" must win over "tb").
static UNITS_SORTED: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut units = UNITS_RAW.to_vec();
    units.sort_by(|a, b| b.len().cmp(&a.len()));
    units
});

const UNITS_RAW: &[&str] = &[
    // Volume
    "fluid ounces",
    "fluid ounce",
    "tablespoons",
    "tablespoon",
    "teaspoons",
    "teaspoon",
    "cups",
    "cup",
    "tbsp",
    "tbs",
    "tsp",
    "fl oz",
    "pints",
    "pint",
    "quarts",
    "quart",
    "milliliters",
    "millilitres",
    "ml",
    "liters",
    "litres",
    "liter",
    "litre",
    "l",
    "c",
    // Weight
    "ounces",
    "ounce",
    "oz",
    "pounds",
    "pound",
    "lbs",
    "lb",
    "kilograms",
    "kilogram",
    "kg",
    "grams",
    "gram",
    "g",
    // Count
    "pieces",
    "piece",
    "cloves",
    "clove",
    "slices",
    "slice",
    "pinches",
    "pinch",
    "dashes",
    "dash",
    "handfuls",
    "handful",
    "bunches",
    "bunch",
    "sprigs",
    "sprig",
    "sticks",
    "stick",
    "stalks",
    "stalk",
    "cans",
    "can",
    "tins",
    "tin",
    "jars",
    "jar",
    "packages",
    "package",
    "packets",
    "packet",
    "heads",
    "head",
    "leaves",
    "fillets",
    "fillet",
];

/// Unicode vulgar fractions and their ASCII spelling.
const VULGAR_FRACTIONS: &[(char, &str)] = &[
    ('½', "1/2"),
    ('⅓', "1/3"),
    ('⅔', "2/3"),
    ('¼', "1/4"),
    ('¾', "3/4"),
    ('⅛', "1/8"),
    ('⅜', "3/8"),
    ('⅝', "5/8"),
    ('⅞', "7/8"),
];

/// Parse one free-text ingredient line, e.g. "- 2 cups flour" or "3 eggs".
pub fn parse_ingredient_line(line: &str) -> ParsedIngredient {
    let cleaned = expand_vulgar_fractions(strip_list_marker(line.trim()));

    match AMOUNT.captures(&cleaned) {
        Some(caps) => {
            let amount = caps
                .name("amount")
                .and_then(|m| evaluate_amount(m.as_str()))
                .unwrap_or(DEFAULT_AMOUNT);
            let rest = caps.name("rest").map(|m| m.as_str()).unwrap_or_default();
            let (unit, name) = extract_unit(rest);
            ParsedIngredient {
                name: clean_name(&name),
                amount,
                unit: unit.unwrap_or(DEFAULT_UNIT).to_string(),
            }
        }
        None => ParsedIngredient {
            name: clean_name(&cleaned),
            amount: DEFAULT_AMOUNT,
            unit: DEFAULT_UNIT.to_string(),
        },
    }
}

/// Parse a name and a separate measure text, as found in positional catalog fields.
///
/// A measure without a leading number ("pinch", "to taste") becomes the unit
/// with an amount of 1.
pub fn parse_measured(name: &str, measure: &str) -> ParsedIngredient {
    let measure = expand_vulgar_fractions(measure.trim());
    let name = clean_name(name);

    if measure.is_empty() {
        return ParsedIngredient {
            name,
            amount: DEFAULT_AMOUNT,
            unit: DEFAULT_UNIT.to_string(),
        };
    }

    match AMOUNT.captures(&measure) {
        Some(caps) => {
            let amount = caps
                .name("amount")
                .and_then(|m| evaluate_amount(m.as_str()))
                .unwrap_or(DEFAULT_AMOUNT);
            let rest = caps.name("rest").map(|m| m.as_str().trim()).unwrap_or_default();
            let unit = match extract_unit(rest) {
                (Some(unit), _) => unit.to_string(),
                (None, _) if rest.is_empty() => DEFAULT_UNIT.to_string(),
                (None, _) => rest.to_string(),
            };
            ParsedIngredient { name, amount, unit }
        }
        None => ParsedIngredient {
            name,
            amount: DEFAULT_AMOUNT,
            unit: measure,
        },
    }
}

/// Parse a raw ingredient; an explicit unit on the input wins over a parsed one.
pub fn parse_raw(raw: &RawIngredient) -> ParsedIngredient {
    let mut parsed = parse_measured(&raw.name, &raw.amount_raw);
    if let Some(unit) = raw.unit.as_deref().map(str::trim) {
        if !unit.is_empty() {
            parsed.unit = unit.to_string();
        }
    }
    parsed
}

/// Parse raw ingredients, drop placeholders and number the rest from 1.
pub fn normalize_ingredients(raw: &[RawIngredient]) -> Vec<Ingredient> {
    number(raw.iter().map(parse_raw))
}

/// Parse free-text ingredient lines, drop placeholders and number the rest from 1.
pub fn normalize_ingredient_lines<'a, I>(lines: I) -> Vec<Ingredient>
where
    I: IntoIterator<Item = &'a str>,
{
    number(
        lines
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .map(parse_ingredient_line),
    )
}

fn number(parsed: impl Iterator<Item = ParsedIngredient>) -> Vec<Ingredient> {
    parsed
        .filter(|p| !p.is_placeholder())
        .zip(1..)
        .map(|(p, id)| p.into_ingredient(id))
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    match LIST_MARKER.find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}

/// Rewrite "1½" as "1 1/2" and a lone "½" as "1/2".
fn expand_vulgar_fractions(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        match VULGAR_FRACTIONS.iter().find(|(v, _)| *v == c) {
            Some((_, ascii)) => {
                if out.ends_with(|p: char| p.is_ascii_digit()) {
                    out.push(' ');
                }
                out.push_str(ascii);
            }
            None => out.push(c),
        }
    }
    out
}

/// Evaluate "2", "2.5", ".5", "1/2" or "1 1/2". Zero, negative and
/// non-finite results are rejected.
fn evaluate_amount(s: &str) -> Option<f64> {
    let compact = s.replace(" /", "/").replace("/ ", "/");
    let mut total = 0.0;
    for part in compact.split_whitespace() {
        total += match part.split_once('/') {
            Some((num, den)) => {
                let num: f64 = num.parse().ok()?;
                let den: f64 = den.parse().ok()?;
                num / den
            }
            None => part.parse::<f64>().ok()?,
        };
    }
    (total.is_finite() && total > 0.0).then_some(total)
}

/// Extract a unit from the beginning of a string.
/// Returns (unit, remaining_string).
fn extract_unit(s: &str) -> (Option<&'static str>, String) {
    let s = s.trim();
    let s_lower = s.to_lowercase();

    for &unit in UNITS_SORTED.iter() {
        if s_lower.starts_with(unit) {
            // Lowercasing can shift byte offsets for non-ASCII text; only slice
            // when the prefix is a char boundary in the original too.
            let Some(after) = s.get(unit.len()..) else {
                continue;
            };
            if after.is_empty()
                || after.starts_with(|c: char| c.is_whitespace() || c == '.' || c == ',')
            {
                let remaining = after.trim_start_matches(['.', ',']).trim();
                return (Some(unit), remaining.to_string());
            }
        }
    }

    (None, s.to_string())
}

fn clean_name(name: &str) -> String {
    let name = name.trim().trim_matches(|c: char| c == '*' || c == '_').trim();
    let name = name.strip_prefix("of ").unwrap_or(name);
    name.trim_end_matches([',', ';']).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_ingredient() {
        let result = parse_ingredient_line("2 cups flour");
        assert_eq!(result.name, "flour");
        assert_eq!(result.amount, 2.0);
        assert_eq!(result.unit, "cups");
    }

    #[test]
    fn test_list_markers_are_stripped() {
        for line in ["- 2 cups flour", "• 2 cups flour", "* 2 cups flour", "1. 2 cups flour"] {
            let result = parse_ingredient_line(line);
            assert_eq!(result.name, "flour", "line: {}", line);
            assert_eq!(result.amount, 2.0, "line: {}", line);
        }
    }

    #[test]
    fn test_decimal_is_not_list_numbering() {
        let result = parse_ingredient_line("1.5 cups milk");
        assert_eq!(result.amount, 1.5);
        assert_eq!(result.unit, "cups");
        assert_eq!(result.name, "milk");
    }

    #[test]
    fn test_fraction_and_mixed_number() {
        let result = parse_ingredient_line("1/2 cup sugar");
        assert_eq!(result.amount, 0.5);
        assert_eq!(result.unit, "cup");
        assert_eq!(result.name, "sugar");

        let result = parse_ingredient_line("1 1/2 cups water");
        assert_eq!(result.amount, 1.5);
        assert_eq!(result.name, "water");
    }

    #[test]
    fn test_vulgar_fractions() {
        assert_eq!(parse_ingredient_line("½ tsp salt").amount, 0.5);
        assert_eq!(parse_ingredient_line("1½ tsp salt").amount, 1.5);
    }

    #[test]
    fn test_no_unit_defaults_to_piece() {
        let result = parse_ingredient_line("3 eggs");
        assert_eq!(result.name, "eggs");
        assert_eq!(result.amount, 3.0);
        assert_eq!(result.unit, DEFAULT_UNIT);
    }

    #[test]
    fn test_no_amount_defaults_to_one() {
        let result = parse_ingredient_line("Salt to taste");
        assert_eq!(result.name, "Salt to taste");
        assert_eq!(result.amount, 1.0);
        assert_eq!(result.unit, DEFAULT_UNIT);
    }

    #[test]
    fn test_unit_glued_to_amount() {
        let result = parse_ingredient_line("200g spaghetti");
        assert_eq!(result.amount, 200.0);
        assert_eq!(result.unit, "g");
        assert_eq!(result.name, "spaghetti");
    }

    #[test]
    fn test_unit_needs_word_boundary() {
        let result = parse_ingredient_line("3 garlic cloves");
        assert_eq!(result.unit, DEFAULT_UNIT);
        assert_eq!(result.name, "garlic cloves");
    }

    #[test]
    fn test_zero_and_division_by_zero_fall_back() {
        assert_eq!(parse_ingredient_line("0 cups rice").amount, 1.0);
        assert_eq!(parse_ingredient_line("1/0 cups rice").amount, 1.0);
        assert_eq!(parse_measured("rice", "0").amount, 1.0);
    }

    #[test]
    fn test_measured_empty_measure() {
        let result = parse_measured("flour", "");
        assert_eq!(
            result,
            ParsedIngredient {
                name: "flour".to_string(),
                amount: 1.0,
                unit: "piece".to_string(),
            }
        );
    }

    #[test]
    fn test_measured_text_only_measure_becomes_unit() {
        let result = parse_measured("Salt", "pinch");
        assert_eq!(result.amount, 1.0);
        assert_eq!(result.unit, "pinch");

        let result = parse_measured("Pepper", "to taste");
        assert_eq!(result.unit, "to taste");
    }

    #[test]
    fn test_measured_unknown_unit_kept_verbatim() {
        let result = parse_measured("Chopped Tomatoes", "1 (400g) can");
        assert_eq!(result.amount, 1.0);
        assert_eq!(result.unit, "(400g) can");
    }

    #[test]
    fn test_raw_explicit_unit_wins() {
        let raw = RawIngredient {
            name: "milk".to_string(),
            amount_raw: "250".to_string(),
            unit: Some("ml".to_string()),
        };
        let result = parse_raw(&raw);
        assert_eq!(result.amount, 250.0);
        assert_eq!(result.unit, "ml");
    }

    #[test]
    fn test_placeholders_are_dropped_and_ids_are_sequential() {
        let ingredients = normalize_ingredient_lines(["2 cups flour", "*", "", "3 eggs"]);
        assert_eq!(ingredients.len(), 2);
        assert_eq!(ingredients[0].id, 1);
        assert_eq!(ingredients[1].id, 2);
        assert_eq!(ingredients[1].name, "eggs");
    }

    #[test]
    fn test_malformed_input_never_breaks_invariants() {
        for line in ["", "   ", "/", "1/", "cups", "...", "½", "-", "99999999999999999999999 g x"] {
            let result = parse_ingredient_line(line);
            assert!(result.amount > 0.0 && result.amount.is_finite(), "line: {:?}", line);
            assert!(!result.unit.is_empty(), "line: {:?}", line);
        }
    }
}
