//! Error types for view compilation and row generation

use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ViewError>;

/// Which name failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    View,
    Column,
    Constant,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameKind::View => write!(f, "view"),
            NameKind::Column => write!(f, "column"),
            NameKind::Constant => write!(f, "constant"),
        }
    }
}

/// A view definition that cannot be compiled. Every variant except
/// `InvalidJson` names the node path of the offending entry, such as
/// `select[2].select[0]` or `constants[1]`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewError {
    #[error("Invalid view definition JSON: {0}")]
    InvalidJson(String),

    #[error("{path}: {message}")]
    Structural { path: String, message: String },

    #[error("{path}: invalid {kind} name '{name}'")]
    NameValidation {
        path: String,
        kind: NameKind,
        name: String,
    },

    #[error("{path}: {source}")]
    Expression {
        path: String,
        #[source]
        source: ferrum_fhirpath::Error,
    },
}

impl ViewError {
    pub(crate) fn structural(path: impl Into<String>, message: impl Into<String>) -> Self {
        ViewError::Structural {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Node path the error refers to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            ViewError::InvalidJson(_) => None,
            ViewError::Structural { path, .. }
            | ViewError::NameValidation { path, .. }
            | ViewError::Expression { path, .. } => Some(path),
        }
    }
}

/// Evaluation failure for one resource, with the node path where it
/// happened (`select[1].forEach`, `where[0]`).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{path}: {source}")]
pub struct GenerateError {
    pub path: String,
    #[source]
    pub source: ferrum_fhirpath::Error,
}

impl GenerateError {
    pub(crate) fn new(path: impl Into<String>, source: ferrum_fhirpath::Error) -> Self {
        GenerateError {
            path: path.into(),
            source,
        }
    }
}
