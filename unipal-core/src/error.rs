//! Core error types for UniPal Sync.

use thiserror::Error;

/// Core error type for model-level operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A timetable slot token did not have the `{day}-{period}` shape.
    #[error("Invalid slot token: {0}")]
    InvalidSlotToken(String),

    /// A scraped day-of-week label was not one of the seven known characters.
    #[error("Unknown day label: {0}")]
    UnknownDayLabel(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

/// An external page parser reported failure.
///
/// The scraping parsers are black-box collaborators; all the pipeline sees is
/// whether parsing succeeded and, on failure, a short diagnostic.
#[derive(Debug, Clone, Error)]
#[error("Parse error: {context}")]
pub struct ParseError {
    /// Short description of what failed to parse.
    pub context: String,
}

impl ParseError {
    /// Creates a parse error with the given context.
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
        }
    }
}
