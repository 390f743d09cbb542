//! Parsing model output into verdicts and routes
//!
//! Models are asked for bare JSON but often wrap it in a ```json fence or add
//! prose around an array, so each parser tries the fence first.

use regex::Regex;
use serde::Deserialize;
use specverify_core::{ExtractedRoute, JudgeError, Verification};
use std::sync::LazyLock;

static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```json\s*([\s\S]*?)\s*```").expect("valid fence regex"));

static JSON_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[\s\S]*\]").expect("valid array regex"));

fn fenced(text: &str) -> Option<&str> {
    JSON_FENCE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// The verdict as models actually write it: the percentage may be a float
/// or out of range.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVerification {
    match_percentage: f64,
    #[serde(default)]
    matched_items: Vec<String>,
    #[serde(default)]
    unmatched_items: Vec<String>,
    #[serde(default)]
    notes: String,
}

/// Parse a verification verdict from model output
pub fn parse_verification(text: &str) -> Result<Verification, JudgeError> {
    let json = fenced(text).unwrap_or(text).trim();
    let raw: RawVerification = serde_json::from_str(json).map_err(|e| {
        JudgeError::MalformedResponse(format!("failed to parse verification result: {}", e))
    })?;

    Ok(Verification {
        match_percentage: raw.match_percentage.round().clamp(0.0, 100.0) as u8,
        matched_items: raw.matched_items,
        unmatched_items: raw.unmatched_items,
        notes: raw.notes,
    })
}

/// Parse extracted routes from model output
pub fn parse_routes(text: &str) -> Result<Vec<ExtractedRoute>, JudgeError> {
    let json = fenced(text)
        .or_else(|| JSON_ARRAY.find(text).map(|m| m.as_str()))
        .unwrap_or(text)
        .trim();

    let routes: Vec<ExtractedRoute> = serde_json::from_str(json).map_err(|e| {
        JudgeError::MalformedResponse(format!("failed to parse route list: {}", e))
    })?;

    Ok(routes
        .into_iter()
        .filter(|route| !route.path.is_empty())
        .map(|mut route| {
            route.method = route.method.trim().to_uppercase();
            route
        })
        .collect())
}
