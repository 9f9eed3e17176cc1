//! Dependency list decoding and encoding at the persistence boundary.
//!
//! Tasks store their dependencies as a JSON array string. Inside the core a
//! dependency list is always a `Vec<TaskId>`; conversion happens only here.

use serde_json::Value;
use thiserror::Error;

use crate::models::TaskId;

/// Errors from the strict dependency decoder.
#[derive(Error, Debug)]
pub enum DependencyParseError {
    #[error("Malformed dependency list: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Dependency list is not an array")]
    NotAnArray,
}

/// Decode a serialized dependency list, surfacing conversion failures.
///
/// Absent or blank input is an empty list, not an error. Elements that are
/// not integer-valued numbers are dropped.
pub fn try_parse_dependencies(raw: Option<&str>) -> Result<Vec<TaskId>, DependencyParseError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(Vec::new());
    };

    match serde_json::from_str::<Value>(raw)? {
        Value::Array(items) => Ok(items.iter().filter_map(as_task_id).collect()),
        _ => Err(DependencyParseError::NotAnArray),
    }
}

/// Decode a serialized dependency list, never failing.
///
/// Any decoding error degrades the task to "no dependencies". Use
/// [`try_parse_dependencies`] to see the error.
pub fn parse_dependencies(raw: Option<&str>) -> Vec<TaskId> {
    try_parse_dependencies(raw).unwrap_or_default()
}

/// Encode a dependency list for storage.
pub fn encode_dependencies(ids: &[TaskId]) -> String {
    // A slice of integers has no map keys or non-finite floats, so
    // serialization cannot fail
    serde_json::to_string(ids).unwrap_or_else(|_| String::from("[]"))
}

/// Accept JSON numbers with an integral value that fits in a `TaskId`.
fn as_task_id(value: &Value) -> Option<TaskId> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(id) = n.as_i64() {
        return Some(id);
    }
    let f = n.as_f64()?;
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as TaskId)
    } else {
        None
    }
}
