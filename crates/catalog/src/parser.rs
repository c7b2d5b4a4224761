//! Parsers for catalog data.
//!
//! Handles three inputs:
//! - `ingredients.json`: `{ "Gin": { "taste": [0.2, 0.1, 0.7, 0.2, 0.8], "alcoholic": true }, ... }`
//! - `questions.json`: `[ { "prompt": ..., "option_a": { "text": ..., "taste": [...] }, "option_b": ... }, ... ]`
//! - free-text taste descriptions such as `"0.4 sweet, 0.8 sour"`

use crate::error::{CatalogError, Result};
use crate::types::*;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Ingredient entry as it appears in `ingredients.json` (the name is the key)
#[derive(Debug, Deserialize)]
struct RawIngredient {
    taste: TasteVector,
    #[serde(default)]
    alcoholic: bool,
}

/// Read a whole file into a string, mapping a missing file to
/// [`CatalogError::FileNotFound`]
fn read_to_string(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(CatalogError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(fs::read_to_string(path)?)
}

fn json_error(source_name: &str, err: serde_json::Error) -> CatalogError {
    CatalogError::JsonError {
        source_name: source_name.to_string(),
        reason: err.to_string(),
    }
}

/// Parse the ingredient mapping from a JSON string
///
/// Ingredients come back in the order they appear in the file. That order
/// becomes the catalog's iteration order.
pub fn parse_ingredients_str(json: &str, source_name: &str) -> Result<Vec<Ingredient>> {
    let raw: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(json).map_err(|e| json_error(source_name, e))?;

    raw.into_iter()
        .map(|(name, value)| {
            let entry: RawIngredient =
                serde_json::from_value(value).map_err(|e| json_error(source_name, e))?;
            Ok(Ingredient {
                name,
                taste: entry.taste,
                alcoholic: entry.alcoholic,
            })
        })
        .collect()
}

/// Parse the ingredients file
pub fn parse_ingredients(path: &Path) -> Result<Vec<Ingredient>> {
    let content = read_to_string(path)?;
    parse_ingredients_str(&content, &file_label(path))
}

/// Parse the question list from a JSON string
pub fn parse_questions_str(json: &str, source_name: &str) -> Result<Vec<Question>> {
    serde_json::from_str(json).map_err(|e| json_error(source_name, e))
}

/// Parse the questions file
pub fn parse_questions(path: &Path) -> Result<Vec<Question>> {
    let content = read_to_string(path)?;
    parse_questions_str(&content, &file_label(path))
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse a single `"<value> <axis>"` fragment
fn parse_taste_fragment(fragment: &str) -> Result<(TasteAxis, f64)> {
    let mut parts = fragment.split_whitespace();

    let value = parts.next().ok_or_else(|| CatalogError::ParseTaste {
        fragment: fragment.to_string(),
        reason: "Missing value".to_string(),
    })?;
    let axis = parts.next().ok_or_else(|| CatalogError::ParseTaste {
        fragment: fragment.to_string(),
        reason: "Missing taste axis".to_string(),
    })?;
    if parts.next().is_some() {
        return Err(CatalogError::ParseTaste {
            fragment: fragment.to_string(),
            reason: "Expected '<value> <axis>'".to_string(),
        });
    }

    let value: f64 = value.parse().map_err(|e| CatalogError::ParseTaste {
        fragment: fragment.to_string(),
        reason: format!("Invalid value: {}", e),
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(CatalogError::ParseTaste {
            fragment: fragment.to_string(),
            reason: format!("Value must be a non-negative number, got {}", value),
        });
    }

    let axis = TasteAxis::from_name(axis).ok_or_else(|| CatalogError::ParseTaste {
        fragment: fragment.to_string(),
        reason: format!("Unknown taste axis '{}'", axis),
    })?;

    Ok((axis, value))
}

/// Free-text taste description: comma-separated `"<value> <axis>"` pairs.
///
/// Axes that are not mentioned stay at zero; a repeated axis keeps the last
/// value.
///
/// ```
/// use catalog::{TasteAxis, TasteVector};
///
/// let taste: TasteVector = "0.4 sweet, 0.8 sour".parse().unwrap();
/// assert_eq!(taste[TasteAxis::Sour], 0.8);
/// assert_eq!(taste[TasteAxis::Spicy], 0.0);
/// ```
impl FromStr for TasteVector {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        let mut taste = TasteVector::zeros();
        for fragment in s.split(',') {
            let fragment = fragment.trim();
            if fragment.is_empty() {
                continue;
            }
            let (axis, value) = parse_taste_fragment(fragment)?;
            taste[axis] = value;
        }
        Ok(taste)
    }
}
