//! Offline parsing commands.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use larder_core::{parse_ingredient_line, parse_measured, segment_instructions};

pub fn parse_ingredient(line: &str, measure: Option<&str>) -> Result<()> {
    let parsed = match measure {
        Some(measure) => parse_measured(line, measure),
        None => parse_ingredient_line(line),
    };
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}

pub fn segment(file: Option<&Path>) -> Result<()> {
    let text = read_input(file)?;
    println!("{}", serde_json::to_string_pretty(&segment_instructions(&text))?);
    Ok(())
}

/// Read a file, or all of stdin when no path is given.
pub fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}
