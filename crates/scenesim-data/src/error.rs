//! Error types for synthetic data generation.

use thiserror::Error;

/// Result type alias for data operations.
pub type DataResult<T> = Result<T, DataError>;

/// Errors raised while generating or validating synthetic data.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Unknown suite preset: {0}")]
    UnknownPreset(String),

    #[error("Unknown {kind} variant: {variant}")]
    UnknownVariant { kind: &'static str, variant: String },

    #[error("Validation failed: {reason} ({} violation(s))", violations.len())]
    ValidationFailure {
        reason: String,
        violations: Vec<String>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DataError {
    /// Every violation carried by a validation failure; empty otherwise.
    pub fn violations(&self) -> &[String] {
        match self {
            DataError::ValidationFailure { violations, .. } => violations,
            _ => &[],
        }
    }
}
