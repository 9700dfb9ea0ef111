//! Error types for the styling and formatting core.
//!
//! None of these surface to the user: every public entry point converts them
//! into a "leave the text alone" fallback and logs the cause.
use thiserror::Error;

/// Top-level core error type.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unsupported formatter language: {0}")]
    UnsupportedLanguage(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid markup: {0}")]
    InvalidMarkup(String),

    #[error("Source location {line}:{column} has no buffer offset")]
    UnresolvableLocation { line: usize, column: usize },

    #[error("Range {start}..{end} exceeds buffer length {len}")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },

    #[error("Unknown syntax theme: {0}")]
    UnknownTheme(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidJson(value.to_string())
    }
}
