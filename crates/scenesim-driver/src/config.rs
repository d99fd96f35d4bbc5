//! Driver configuration.

use scenesim_data::Viewport;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default `waitForFunction` timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default `waitForFunction` polling interval in milliseconds.
pub const DEFAULT_POLLING_MS: u64 = 50;

/// Driver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Initial page viewport.
    pub viewport: Viewport,
    /// Accepted for call-site compatibility; the simulation never opens a window.
    pub headless: bool,
    pub default_timeout_ms: u64,
    pub polling_interval_ms: u64,
    /// Expose the simulated graphics context to scripts on initialize.
    pub install_graphics_globals: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            headless: true,
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            polling_interval_ms: DEFAULT_POLLING_MS,
            install_graphics_globals: true,
        }
    }
}

impl DriverConfig {
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            timeout: Duration::from_millis(self.default_timeout_ms),
            polling: Duration::from_millis(self.polling_interval_ms),
        }
    }
}

/// Options for `wait_for_function`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub polling: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            polling: Duration::from_millis(DEFAULT_POLLING_MS),
        }
    }
}

impl WaitOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_polling(mut self, polling: Duration) -> Self {
        self.polling = polling;
        self
    }
}
