//! Coordinator configuration.

use crate::error::{HarnessError, HarnessResult};
use scenesim_data::Complexity;
use serde::{Deserialize, Serialize};

/// Coordinator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoordinatorConfig {
    /// Name used in logs and recorded test results.
    pub name: String,
    /// Seed for the coordinator's own generator.
    pub seed: u32,
    /// Start the resource tracker on setup.
    pub track_resources: bool,
    /// Start the performance tracker on setup.
    pub track_performance: bool,
    /// Performance sampling interval in milliseconds.
    pub performance_interval_ms: u64,
    /// Scene complexity when a request names none.
    pub default_complexity: Complexity,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            name: "scenesim".to_string(),
            seed: 12345,
            track_resources: true,
            track_performance: true,
            performance_interval_ms: 100,
            default_complexity: Complexity::Medium,
        }
    }
}

impl CoordinatorConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_tracking(mut self, resources: bool, performance: bool) -> Self {
        self.track_resources = resources;
        self.track_performance = performance;
        self
    }

    /// Parse from JSON. Missing fields take defaults; unknown fields are
    /// rejected.
    pub fn from_json(json: &str) -> HarnessResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| HarnessError::Config(e.to_string()))?;
        if config.performance_interval_ms == 0 {
            return Err(HarnessError::Config(
                "performance_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }
}
