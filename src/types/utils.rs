//! Shared utility functions for JSON extraction and small numeric helpers.
//!
//! ## JSON Extraction Helpers
//!
//! Provides ergonomic helpers for extracting values from `serde_json::Value`:
//! - `json_string`, `json_string_or` - Extract strings
//! - `as_score` - Read 0-100 scores

use std::fmt::Display;

use crate::constants::scoring::{MAX_SCORE, MIN_SCORE};

// =============================================================================
// JSON Value Extraction Helpers
// =============================================================================

/// Extract string from JSON value by key.
#[inline]
pub fn json_string(value: &serde_json::Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(String::from)
}

/// Extract string with default value.
#[inline]
pub fn json_string_or(value: &serde_json::Value, key: &str, default: &str) -> String {
    json_string(value, key).unwrap_or_else(|| default.to_string())
}

/// Read a 0-100 score from a JSON value.
///
/// Accepts numbers and numeric strings (`"72"`, `"72.5"`). Returns `None` for
/// anything else, including non-finite numbers. Usable values are clamped.
pub fn as_score(value: &serde_json::Value) -> Option<f64> {
    let raw = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    raw.is_finite().then(|| raw.clamp(MIN_SCORE, MAX_SCORE))
}

// =============================================================================
// String & Number Utilities
// =============================================================================

/// Round to two decimal places.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Shorten text for log previews without splitting a character.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...", head)
}

/// Filter an iterator of Results, logging errors at debug level before discarding.
pub fn log_filter_error<T, E: Display>(result: Result<T, E>, context: &str) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::debug!("{}: {}", context, e);
            None
        }
    }
}
