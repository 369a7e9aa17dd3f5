//! Error types for querylab-core.
//!
//! The engine has no fallible I/O; every error here is a user-facing refusal.

use thiserror::Error;

use crate::validator::ValidationResult;

/// Playground error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaygroundError {
    #[error("Query rejected: {}", .0.errors().collect::<Vec<_>>().join("; "))]
    Rejected(ValidationResult),

    #[error("Invalid name: a saved query needs a non-empty name")]
    InvalidName,

    #[error("Result shape mismatch: expected {expected} values, row {row} has {found}")]
    ShapeMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Result type for playground operations
pub type PlaygroundResult<T> = Result<T, PlaygroundError>;

impl serde::Serialize for PlaygroundError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
