//! Fixture file IO and dataset checks.

use chrono::{DateTime, Utc};
use scenesim_data::DataError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Error type for fixture file operations.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of validating one fixture file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub file: String,
    pub checked_at: DateTime<Utc>,
    /// Objects carrying an `id`.
    pub entities: usize,
    pub violations: Vec<String>,
    pub valid: bool,
}

/// Write `value` as pretty JSON to `output`, or to stdout when absent.
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<(), FixtureError> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, json)?;
            tracing::info!(path = %path.display(), "Fixture written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn read_json(path: &Path) -> Result<Value, FixtureError> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| FixtureError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Validate the dataset stored at `path`.
pub fn validate_file(path: &Path) -> Result<ValidationReport, FixtureError> {
    let dataset = read_json(path)?;
    let violations = scenesim_data::validate_dataset(&dataset);
    Ok(ValidationReport {
        file: path.display().to_string(),
        checked_at: Utc::now(),
        entities: count_entities(&dataset),
        valid: violations.is_empty(),
        violations,
    })
}

fn count_entities(value: &Value) -> usize {
    match value {
        Value::Object(map) => {
            usize::from(map.contains_key("id")) + map.values().map(count_entities).sum::<usize>()
        }
        Value::Array(items) => items.iter().map(count_entities).sum(),
        _ => 0,
    }
}
