//! Difficulty classification.

use crate::types::Difficulty;

/// Longest cooking time that can still be [`Difficulty::Easy`].
pub const EASY_MAX_MINUTES: u32 = 30;
/// Largest ingredient count that can still be [`Difficulty::Easy`].
pub const EASY_MAX_INGREDIENTS: usize = 6;
/// Cooking times above this are [`Difficulty::Hard`].
pub const HARD_OVER_MINUTES: u32 = 60;
/// Ingredient counts at or above this are [`Difficulty::Hard`].
pub const HARD_MIN_INGREDIENTS: usize = 10;

/// Classify a recipe from its cooking time and ingredient count.
///
/// The easy guard is evaluated first, then the hard guard; anything else is medium.
pub fn classify(cooking_time_minutes: u32, ingredient_count: usize) -> Difficulty {
    if cooking_time_minutes <= EASY_MAX_MINUTES && ingredient_count <= EASY_MAX_INGREDIENTS {
        Difficulty::Easy
    } else if cooking_time_minutes > HARD_OVER_MINUTES || ingredient_count >= HARD_MIN_INGREDIENTS {
        Difficulty::Hard
    } else {
        Difficulty::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        assert_eq!(classify(30, 6), Difficulty::Easy);
        assert_eq!(classify(31, 6), Difficulty::Medium);
        assert_eq!(classify(30, 7), Difficulty::Medium);
        assert_eq!(classify(60, 9), Difficulty::Medium);
        assert_eq!(classify(61, 1), Difficulty::Hard);
        assert_eq!(classify(10, 10), Difficulty::Hard);
    }

    #[test]
    fn test_zero_inputs_are_easy() {
        assert_eq!(classify(0, 0), Difficulty::Easy);
    }

    #[test]
    fn test_tiers_respect_guards() {
        for minutes in 0..120 {
            for count in 0..15 {
                let easy = minutes <= 30 && count <= 6;
                let hard = minutes > 60 || count >= 10;
                match classify(minutes, count) {
                    Difficulty::Easy => assert!(easy),
                    Difficulty::Hard => assert!(!easy && hard),
                    Difficulty::Medium => assert!(!easy && !hard),
                }
            }
        }
    }
}
