//! Error types for the simulated driver.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors raised by the simulated driver and its page.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriverError {
    #[error("Driver not initialized. Call initialize() first.")]
    NotInitialized,

    #[error("Driver is already initialized")]
    DoubleInitialization,

    #[error("waitForFunction timed out after {elapsed:?} (timeout {timeout:?})")]
    WaitTimeout { elapsed: Duration, timeout: Duration },

    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    #[error("Driver was released by its instance registry")]
    ReleasedByRegistry,
}

impl DriverError {
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }
}
