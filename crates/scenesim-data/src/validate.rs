//! Dataset validation.
//!
//! Walks arbitrary JSON and reports every `id` seen more than once. All
//! violations are collected in one pass.

use crate::error::{DataError, DataResult};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Validate a dataset, returning one message per violation.
pub fn validate_dataset(dataset: &Value) -> Vec<String> {
    if !matches!(dataset, Value::Object(_) | Value::Array(_)) {
        return vec![format!(
            "Dataset root must be an object or array, found {}",
            value_kind(dataset)
        )];
    }

    let mut seen = HashMap::new();
    let mut errors = Vec::new();
    walk(dataset, "root".to_string(), &mut seen, &mut errors);
    errors
}

/// Serialize `entities` and validate the result.
pub fn validate_entities<T: Serialize + ?Sized>(entities: &T) -> DataResult<Vec<String>> {
    let value = serde_json::to_value(entities)?;
    Ok(validate_dataset(&value))
}

/// Fail with every violation when the dataset is invalid.
pub fn ensure_valid(dataset: &Value) -> DataResult<()> {
    let violations = validate_dataset(dataset);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(DataError::ValidationFailure {
            reason: "dataset contains duplicate or malformed entries".to_string(),
            violations,
        })
    }
}

/// An id together with its JSON kind, so `"1"` and `1` stay distinct.
type IdKey = (&'static str, String);

fn walk(value: &Value, path: String, seen: &mut HashMap<IdKey, String>, errors: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if let Some(key) = map.get("id").and_then(id_key) {
                match seen.get(&key) {
                    Some(first) => errors.push(format!(
                        "Duplicate id \"{}\" at {path} (first seen at {first})",
                        key.1
                    )),
                    None => {
                        seen.insert(key, path.clone());
                    }
                }
            }
            for (key, child) in map {
                walk(child, format!("{path}.{key}"), seen, errors);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                walk(child, format!("{path}[{index}]"), seen, errors);
            }
        }
        _ => {}
    }
}

fn id_key(id: &Value) -> Option<IdKey> {
    match id {
        Value::String(s) => Some((value_kind(id), s.clone())),
        Value::Number(n) => Some((value_kind(id), n.to_string())),
        _ => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
