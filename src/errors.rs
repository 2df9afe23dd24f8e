//! Error types for kbqa
//!
//! One error enum covers loading, encoding and retrieval, so callers can
//! match on the failure kind without string inspection.

use thiserror::Error;

/// Main error type for knowledge base loading and retrieval
#[derive(Error, Debug)]
pub enum QaError {
    /// A knowledge base line could not be parsed or lacks a required field
    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// Blank or whitespace-only question
    #[error("Question is empty")]
    EmptyQuery,

    /// No stored pairs to match against
    #[error("Knowledge base is empty; nothing to match against")]
    EmptyKnowledgeBase,

    /// The embedding capability failed
    #[error("Encoding failed: {0}")]
    Encoding(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl QaError {
    /// Whether retrying the same call could succeed.
    ///
    /// Only encoder failures qualify; every other variant is a property of
    /// the input or the loaded data.
    pub fn is_retryable(&self) -> bool {
        matches!(self, QaError::Encoding(_))
    }
}

/// Result type alias for kbqa operations
pub type Result<T> = std::result::Result<T, QaError>;
