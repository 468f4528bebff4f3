//! Parsing the model's JSON restaurant shortlist
//!
//! JSON mode makes well-formed output likely, not guaranteed. Parsing is a
//! fallible step; the caller decides how to degrade.

use crate::prompts::MAX_SHORTLIST;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One venue the model picked, with its justification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortlistEntry {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum ShortlistError {
    #[error("shortlist is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("shortlist JSON has no restaurants array")]
    MissingRestaurants,
}

/// Parse `{"restaurants": [...]}` (or a bare array) into at most
/// [`MAX_SHORTLIST`] entries. Entries without a name are skipped.
pub fn parse_shortlist(raw: &str) -> Result<Vec<ShortlistEntry>, ShortlistError> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("restaurants") {
            Some(Value::Array(items)) => items,
            _ => return Err(ShortlistError::MissingRestaurants),
        },
        _ => return Err(ShortlistError::MissingRestaurants),
    };

    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<ShortlistEntry>(item).ok())
        .filter(|entry| !entry.name.trim().is_empty())
        .take(MAX_SHORTLIST)
        .collect())
}

/// Models sometimes wrap JSON in a markdown fence even in JSON mode.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
