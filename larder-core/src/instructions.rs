//! Instruction segmentation and timer detection.
//!
//! Splits an instruction blob into ordered steps and annotates each step with
//! an optional duration and whether it deserves an on-screen timer.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::Instruction;

/// Explicit durations: "10 minutes", "1 hr", "30 seconds".
static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*(hours?|hrs?|minutes?|mins?|seconds?|secs?)\b")
        .expect("Invalid duration regex")
});

/// Words that suggest a step needs a timer even without a number.
static TIMER_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:minutes?\b|mins?\b|hours?\b|until\b|boil|simmer|bak(?:e|ing)|roast|rest(?:s|ed|ing)?\b|cool)",
    )
    .expect("Invalid timer hint regex")
});

/// Default minutes for steps that name a timed technique but no duration.
/// Checked in order; the first match wins.
static KEYWORD_DURATIONS: LazyLock<Vec<(Regex, u32)>> = LazyLock::new(|| {
    [
        (r"(?i)\b(?:boil|simmer)", 15),
        (r"(?i)\b(?:bak(?:e|ing)|roast)", 30),
        (r"(?i)\b(?:fry|fried|frying|saut[eé])", 10),
        (r"(?i)\b(?:rest(?:s|ed|ing)?\b|cool)", 10),
    ]
    .into_iter()
    .map(|(pattern, minutes)| {
        (
            Regex::new(pattern).expect("Invalid keyword duration regex"),
            minutes,
        )
    })
    .collect()
});

/// "Step 3", "STEP 3:", "3.", "3)" and bullets at the start of a line.
static STEP_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:step\s*\d+\s*[:.)\-]?\s*|\d+[.)](?:\s+|$)|[-•·*+]+\s*)")
        .expect("Invalid step prefix regex")
});

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|\n|\r").expect("Invalid line break regex"));

/// Duration and timer flag for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimerInfo {
    pub duration_minutes: Option<u32>,
    pub timer_required: bool,
}

/// Split a blob on any line break style and segment the resulting lines.
pub fn segment_instructions(blob: &str) -> Vec<Instruction> {
    segment_lines(LINE_BREAK.split(blob))
}

/// Segment already-separated lines into numbered steps.
///
/// Lines that hold nothing actionable (blank, "*", a bare "STEP 2") are dropped
/// without consuming a step number.
pub fn segment_lines<'a, I>(lines: I) -> Vec<Instruction>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .filter_map(clean_step)
        .zip(1..)
        .map(|(text, id)| {
            let timer = detect_timer(&text);
            Instruction {
                id,
                text,
                duration_minutes: timer.duration_minutes,
                timer_required: timer.timer_required,
            }
        })
        .collect()
}

/// Count the steps a blob would produce.
pub fn count_steps(blob: &str) -> usize {
    LINE_BREAK.split(blob).filter_map(clean_step).count()
}

fn clean_step(line: &str) -> Option<String> {
    let mut text = line.trim();
    // Prefixes can stack ("1. Step 1: ...")
    while let Some(m) = STEP_PREFIX.find(text) {
        if m.end() == 0 {
            break;
        }
        text = text[m.end()..].trim_start();
    }
    let text = text.trim();
    if text.is_empty() || text.chars().all(|c| c == '*' || c.is_ascii_punctuation()) {
        None
    } else {
        Some(text.to_string())
    }
}

/// Detect a duration and the timer flag for one step.
pub fn detect_timer(text: &str) -> TimerInfo {
    let duration_minutes = explicit_duration(text).or_else(|| keyword_duration(text));
    TimerInfo {
        duration_minutes,
        timer_required: duration_minutes.is_some() || TIMER_HINT.is_match(text),
    }
}

/// First explicit duration in the text, converted to minutes.
/// Seconds round to the nearest minute; a result of zero counts as no duration.
pub fn explicit_duration(text: &str) -> Option<u32> {
    let caps = DURATION.captures(text)?;
    let value: u32 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2)?.as_str().to_lowercase();

    let minutes = if unit.starts_with('h') {
        value.saturating_mul(60)
    } else if unit.starts_with('s') {
        (f64::from(value) / 60.0).round() as u32
    } else {
        value
    };

    (minutes > 0).then_some(minutes)
}

fn keyword_duration(text: &str) -> Option<u32> {
    KEYWORD_DURATIONS
        .iter()
        .find(|(pattern, _)| pattern.is_match(text))
        .map(|(_, minutes)| *minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_every_line_break_style() {
        let steps = segment_instructions("Chop onions.\r\nHeat oil.\rAdd onions.\nServe.");
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0].text, "Chop onions.");
        assert_eq!(steps[3].text, "Serve.");
        assert_eq!(
            steps.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn test_drops_empty_and_placeholder_lines() {
        let steps = segment_instructions("\n  \n*\nMix well.\n\n");
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].id, 1);
        assert_eq!(steps[0].text, "Mix well.");
    }

    #[test]
    fn test_drops_bare_step_headings() {
        let steps = segment_instructions("STEP 1\nPreheat the oven.\nSTEP 2\nStep 3: Slice the bread.");
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].text, "Preheat the oven.");
        assert_eq!(steps[1].text, "Slice the bread.");
        assert_eq!(steps[1].id, 2);
    }

    #[test]
    fn test_strips_numbering() {
        let steps = segment_lines(["1. Whisk the eggs.", "2) Pour into pan."]);
        assert_eq!(steps[0].text, "Whisk the eggs.");
        assert_eq!(steps[1].text, "Pour into pan.");
    }

    #[test]
    fn test_explicit_durations() {
        assert_eq!(explicit_duration("Cook for 10 minutes."), Some(10));
        assert_eq!(explicit_duration("Cook for 5 mins."), Some(5));
        assert_eq!(explicit_duration("Braise for 2 hours."), Some(120));
        assert_eq!(explicit_duration("Leave 1 hr."), Some(60));
        assert_eq!(explicit_duration("Blend for 90 seconds."), Some(2));
        assert_eq!(explicit_duration("Pulse for 10 seconds."), None);
        assert_eq!(explicit_duration("Add 5 minced cloves."), None);
    }

    #[test]
    fn test_keyword_fallback_order() {
        assert_eq!(detect_timer("Bring to a boil.").duration_minutes, Some(15));
        assert_eq!(detect_timer("Bake until golden.").duration_minutes, Some(30));
        assert_eq!(detect_timer("Fry the onions.").duration_minutes, Some(10));
        assert_eq!(detect_timer("Sauté the garlic.").duration_minutes, Some(10));
        assert_eq!(detect_timer("Let it cool.").duration_minutes, Some(10));
        // boil is listed before bake
        assert_eq!(detect_timer("Boil, then bake.").duration_minutes, Some(15));
    }

    #[test]
    fn test_explicit_duration_beats_keyword() {
        let timer = detect_timer("Simmer for 40 minutes.");
        assert_eq!(timer.duration_minutes, Some(40));
        assert!(timer.timer_required);
    }

    #[test]
    fn test_timer_hint_without_duration() {
        let timer = detect_timer("Stir until thickened.");
        assert_eq!(timer.duration_minutes, None);
        assert!(timer.timer_required);
    }

    #[test]
    fn test_plain_step_has_no_timer() {
        let timer = detect_timer("Season with salt and pepper.");
        assert_eq!(timer, TimerInfo::default());
    }

    #[test]
    fn test_duration_always_implies_timer() {
        let blob = "Boil water.\nChop 3 carrots.\nRoast 1 hour.\nRest.\nMix.\nFry 2 mins.";
        for step in segment_instructions(blob) {
            if step.duration_minutes.is_some() {
                assert!(step.timer_required, "step: {}", step.text);
            }
        }
    }

    #[test]
    fn test_count_steps_matches_segmentation() {
        let blob = "STEP 1\nChop.\n\nFry.\n*";
        assert_eq!(count_steps(blob), segment_instructions(blob).len());
        assert_eq!(count_steps(blob), 2);
    }
}
