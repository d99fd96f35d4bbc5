//! Error types for the harness.

use scenesim_data::DataError;
use scenesim_driver::DriverError;
use thiserror::Error;

/// Result type alias for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors raised by the coordinator, validators and configuration loading.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Coordinator not initialized. Call setup() first.")]
    NotInitialized,

    #[error("Coordinator is already set up; call cleanup() first")]
    AlreadySetup,

    #[error("Unknown test data kind: {0}")]
    UnknownDataKind(String),

    #[error("Validation failed: {reason}")]
    ValidationFailure {
        reason: String,
        violations: Vec<String>,
    },

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl HarnessError {
    /// A failure with a single violation.
    pub fn validation(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::ValidationFailure {
            violations: vec![reason.clone()],
            reason,
        }
    }

    /// Get the error category for logging/metrics.
    pub fn category(&self) -> &'static str {
        match self {
            HarnessError::NotInitialized => "not_initialized",
            HarnessError::AlreadySetup => "already_setup",
            HarnessError::UnknownDataKind(_) => "unknown_data_kind",
            HarnessError::ValidationFailure { .. } => "validation",
            HarnessError::Driver(DriverError::WaitTimeout { .. }) => "timeout",
            HarnessError::Driver(_) => "driver",
            HarnessError::Data(_) => "data",
            HarnessError::Config(_) => "config",
        }
    }

    /// Every violation carried by this error; empty for non-validation errors.
    pub fn violations(&self) -> &[String] {
        match self {
            HarnessError::ValidationFailure { violations, .. } => violations,
            HarnessError::Data(data) => data.violations(),
            _ => &[],
        }
    }
}
