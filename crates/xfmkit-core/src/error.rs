//! Error types for transform conversion and parsing.
//!
//! Failures come from three places: inverting a singular matrix, reading
//! malformed matrix text, and the underlying I/O.

use thiserror::Error;

/// Main error type for transform operations.
#[derive(Error, Debug)]
pub enum TransformError {
    /// A matrix that had to be inverted is singular.
    #[error("Singular matrix: {0}")]
    SingularMatrix(String),

    /// A token could not be read as a number.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Matrix text held the wrong number of values.
    #[error("Token count mismatch: expected {expected}, got {actual}")]
    TokenCount {
        expected: usize,
        actual: usize,
    },

    /// Reading the transform text failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for transform operations.
pub type Result<T> = std::result::Result<T, TransformError>;

impl TransformError {
    /// Create a singular matrix error.
    pub fn singular(msg: impl Into<String>) -> Self {
        Self::SingularMatrix(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
