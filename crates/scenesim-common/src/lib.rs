//! # SceneSim Common
//!
//! Shared plumbing for the SceneSim crates.
//!
//! ## Features
//!
//! - Logging configuration and setup
//! - Fixed-interval polling with a deadline

use std::time::Duration;
use thiserror::Error;

pub mod logging;
pub mod poll;

pub use logging::{init_logging, try_init_logging, LogConfig, LogFormat};
pub use poll::PollSchedule;

/// Errors raised by the polling utilities.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollError {
    /// The deadline passed before the condition held.
    #[error("Timed out after {elapsed:?} (timeout {timeout:?})")]
    Timeout { elapsed: Duration, timeout: Duration },
}

impl PollError {
    /// Time spent polling before giving up.
    pub fn elapsed(&self) -> Duration {
        match self {
            PollError::Timeout { elapsed, .. } => *elapsed,
        }
    }
}
