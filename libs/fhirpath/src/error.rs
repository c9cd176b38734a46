//! Error types for the expression engine

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Compile and evaluation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed expression text. `position` is the character offset of the
    /// offending token.
    #[error("Syntax error at position {position}: {message}")]
    Syntax { message: String, position: usize },

    #[error("Unknown constant: %{0}")]
    UnknownConstant(String),

    /// An operator that needs a single item received several.
    #[error("Cardinality error: {0}")]
    Cardinality(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Terminology service unavailable: {0}")]
    TerminologyUnavailable(String),
}

impl Error {
    pub(crate) fn syntax(message: impl Into<String>, position: usize) -> Self {
        Error::Syntax {
            message: message.into(),
            position,
        }
    }
}
