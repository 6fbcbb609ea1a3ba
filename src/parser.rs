//! # Response Parser Module
//!
//! Recovers a JSON object from the model's free-form reply. Candidates are
//! chosen by a tiered strategy, first hit wins:
//!
//! 1. the contents of a fenced code block (with or without a `json` tag),
//! 2. the slice from the first `{` to the last `}`,
//! 3. the whole trimmed reply.
//!
//! The chosen candidate is parsed exactly once. A parse failure is terminal:
//! re-asking the model with the same prompt rarely fixes malformed output.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[ \t]*(?:[jJ][sS][oO][nN])?[ \t]*\r?\n?(.*?)```")
        .expect("fenced block pattern is valid")
});

/// Which recovery tier produced the JSON candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    FencedBlock,
    BraceScan,
    RawText,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::FencedBlock => "fenced code block",
            Strategy::BraceScan => "brace scan",
            Strategy::RawText => "raw text",
        };
        f.write_str(name)
    }
}

/// Error raised when the model reply cannot be turned into a JSON object
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The model returned nothing
    #[error("the model returned an empty response")]
    EmptyResponse,

    /// The candidate is not valid JSON
    #[error("invalid JSON in {strategy}: {message}")]
    InvalidJson { strategy: Strategy, message: String },

    /// The candidate is valid JSON but not an object
    #[error("expected a JSON object in {strategy}, found {found}")]
    NotAnObject {
        strategy: Strategy,
        found: &'static str,
    },
}

/// Outcome of parsing a model reply
#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult {
    FencedBlockFound(Value),
    BraceScanUsed(Value),
    RawTextUsed(Value),
    ParseFailed(ParseError),
}

impl ParseResult {
    /// The tier that produced the value, if parsing succeeded
    pub fn strategy(&self) -> Option<Strategy> {
        match self {
            ParseResult::FencedBlockFound(_) => Some(Strategy::FencedBlock),
            ParseResult::BraceScanUsed(_) => Some(Strategy::BraceScan),
            ParseResult::RawTextUsed(_) => Some(Strategy::RawText),
            ParseResult::ParseFailed(_) => None,
        }
    }

    pub fn into_value(self) -> Result<Value, ParseError> {
        match self {
            ParseResult::FencedBlockFound(value)
            | ParseResult::BraceScanUsed(value)
            | ParseResult::RawTextUsed(value) => Ok(value),
            ParseResult::ParseFailed(e) => Err(e),
        }
    }
}

/// Inner content of the first fenced code block
pub fn fenced_block(text: &str) -> Option<&str> {
    FENCED_BLOCK
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|inner| inner.as_str().trim())
}

/// Slice from the first `{` to the last `}`
pub fn brace_scan(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Pick the JSON candidate according to the tiered strategy
pub fn select_candidate(text: &str) -> (Strategy, &str) {
    if let Some(inner) = fenced_block(text) {
        return (Strategy::FencedBlock, inner);
    }
    if let Some(slice) = brace_scan(text) {
        return (Strategy::BraceScan, slice);
    }
    (Strategy::RawText, text.trim())
}

/// Parse a model reply into a JSON object
pub fn parse(response: &str) -> ParseResult {
    if response.trim().is_empty() {
        return ParseResult::ParseFailed(ParseError::EmptyResponse);
    }

    let (strategy, candidate) = select_candidate(response);
    debug!(%strategy, bytes = candidate.len(), "Selected JSON candidate");

    let value = match serde_json::from_str::<Value>(candidate) {
        Ok(value) => value,
        Err(e) => {
            warn!(%strategy, "Model response is not valid JSON: {}", e);
            return ParseResult::ParseFailed(ParseError::InvalidJson {
                strategy,
                message: e.to_string(),
            });
        }
    };

    if !value.is_object() {
        return ParseResult::ParseFailed(ParseError::NotAnObject {
            strategy,
            found: json_type_name(&value),
        });
    }

    match strategy {
        Strategy::FencedBlock => ParseResult::FencedBlockFound(value),
        Strategy::BraceScan => ParseResult::BraceScanUsed(value),
        Strategy::RawText => ParseResult::RawTextUsed(value),
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
