//! Algorithm: age spread inside a family.
//!
//! Given family members, return `[youngest, eldest, eldest - youngest]`,
//! e.g. `[13, 67, 54]`.
//!
//! Run with: cargo run --bin algo_age_difference

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Relative {
    pub name: String,
    pub age: u32,
}

impl Relative {
    pub fn new(name: impl Into<String>, age: u32) -> Self {
        Self {
            name: name.into(),
            age,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgeError {
    #[error("cannot compute an age difference for an empty family")]
    EmptyFamily,
}

// =============================================================================
// Milestone 1: Single pass min/max
// =============================================================================

/// O(n) time, O(1) extra space: one fold tracks both extremes.
pub fn find_age_difference(relatives: &[Relative]) -> Result<[u32; 3], AgeError> {
    let (youngest, eldest) = relatives
        .iter()
        .map(|r| r.age)
        .fold(None, |acc: Option<(u32, u32)>, age| match acc {
            None => Some((age, age)),
            Some((lo, hi)) => Some((lo.min(age), hi.max(age))),
        })
        .ok_or(AgeError::EmptyFamily)?;

    Ok([youngest, eldest, eldest - youngest])
}

// =============================================================================
// Milestone 2: Loading relatives from JSON
// =============================================================================

pub fn parse_relatives(json: &str) -> Result<Vec<Relative>> {
    serde_json::from_str(json).context("expected a JSON array of {name, age} objects")
}

fn main() -> Result<()> {
    println!("{}", "=== Age Difference ===".bold());

    let family = parse_relatives(
        r#"[
            {"name": "Paul", "age": 28},
            {"name": "John", "age": 33},
            {"name": "Ada", "age": 13},
            {"name": "Grace", "age": 67}
        ]"#,
    )?;

    for relative in &family {
        println!("  {:<6} {}", relative.name, relative.age);
    }

    let [youngest, eldest, spread] = find_age_difference(&family)?;
    println!(
        "\nYoungest: {}  Eldest: {}  Difference: {}",
        youngest,
        eldest,
        spread.to_string().green()
    );

    match find_age_difference(&[]) {
        Ok(result) => println!("Empty family: {:?}", result),
        Err(err) => println!("Empty family: {}", err.to_string().yellow()),
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
