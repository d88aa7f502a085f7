//! Response normalizer
//!
//! Turns raw model output into a [`StructuredResult`]. Models are asked for
//! bare JSON but routinely wrap it in code fences, add chatter around it, or
//! drop fields, so parsing runs an ordered chain of strategies and keeps the
//! first success.

use crate::models::StructuredResult;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("response could not be parsed into a structured result")]
pub struct NotParseable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// Raw text must be exactly one JSON object matching the schema.
    Strict,
    /// Strip ``` / ```json fences and stray backticks, then parse strictly.
    FenceStripped,
    /// Take the outermost `{...}` span, parse as generic JSON and coerce.
    BestEffort,
}

/// Strategies in the order they are tried.
pub const STRATEGIES: [ParseStrategy; 3] = [
    ParseStrategy::Strict,
    ParseStrategy::FenceStripped,
    ParseStrategy::BestEffort,
];

impl ParseStrategy {
    pub fn apply(&self, raw: &str) -> Option<StructuredResult> {
        match self {
            ParseStrategy::Strict => parse_strict(raw),
            ParseStrategy::FenceStripped => parse_strict(&strip_fences(raw)),
            ParseStrategy::BestEffort => parse_best_effort(raw),
        }
    }
}

/// Run the strategy chain over `raw`.
pub fn normalize(raw: &str) -> Result<StructuredResult, NotParseable> {
    normalize_with_strategy(raw).map(|(result, _)| result)
}

/// Like [`normalize`], also reporting which strategy succeeded.
pub fn normalize_with_strategy(
    raw: &str,
) -> Result<(StructuredResult, ParseStrategy), NotParseable> {
    for strategy in STRATEGIES {
        if let Some(result) = strategy.apply(raw) {
            debug!(?strategy, "Normalized research response");
            return Ok((result, strategy));
        }
    }

    debug!("No parse strategy matched the research response");
    Err(NotParseable)
}

fn parse_strict(text: &str) -> Option<StructuredResult> {
    serde_json::from_str::<StructuredResult>(text).ok()
}

fn strip_fences(raw: &str) -> String {
    raw.replace("```json", "")
        .replace("```", "")
        .trim()
        .trim_end_matches('`')
        .trim()
        .to_string()
}

/// Outermost brace span: first `{` through last `}`.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

fn parse_best_effort(raw: &str) -> Option<StructuredResult> {
    let span = extract_json_object(raw)?;
    let value: Value = serde_json::from_str(span).ok()?;
    let object = value.as_object()?;

    Some(StructuredResult {
        topic: coerce_string(object, "topic"),
        summary: coerce_string(object, "summary"),
        sources: coerce_string_list(object, "sources"),
        tools_used: coerce_string_list(object, "tools_used"),
    })
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn coerce_string(object: &Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(scalar_to_string)
        .unwrap_or_default()
}

fn coerce_string_list(object: &Map<String, Value>, key: &str) -> Vec<String> {
    match object.get(key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
        Some(other) => scalar_to_string(other).into_iter().collect(),
    }
}
