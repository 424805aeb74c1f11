//! Built-in actions for the project/task-management domain.

pub mod notify;
pub mod reminder;
pub mod task;

use serde_json::{Map, Value};

/// Fetch a string param, if present and actually a string.
pub(crate) fn str_param<'a>(params: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}

/// Push a problem for `key` unless it is present as a non-empty string.
pub(crate) fn require_str(params: &Map<String, Value>, key: &str, problems: &mut Vec<String>) {
    match params.get(key) {
        None => problems.push(format!("missing required param '{key}'")),
        Some(Value::String(s)) if !s.is_empty() => {}
        Some(Value::String(_)) => problems.push(format!("param '{key}' must not be empty")),
        Some(_) => problems.push(format!("param '{key}' must be a string")),
    }
}
