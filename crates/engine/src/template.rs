//! Template resolution for action params.
//!
//! String params may embed `{{dotted.path}}` placeholders, resolved against
//! the execution context just before an action runs. A placeholder whose
//! path cannot be walked keeps its literal `{{...}}` text; it never resolves
//! to an empty string. Resolution is pure and never suspends.

use serde_json::{Map, Value};

/// Resolve every string value in `params` (recursively through nested
/// objects and arrays) against `context`.
pub fn resolve_params(params: &Map<String, Value>, context: &Value) -> Map<String, Value> {
    params
        .iter()
        .map(|(key, value)| (key.clone(), resolve_value(value, context)))
        .collect()
}

/// Resolve one param value. Non-strings pass through unchanged.
pub fn resolve_value(value: &Value, context: &Value) -> Value {
    match value {
        Value::String(text) => Value::String(resolve_str(text, context)),
        Value::Object(object) => Value::Object(resolve_params(object, context)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| resolve_value(item, context))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Substitute every `{{dotted.path}}` occurrence in `input`.
pub fn resolve_str(input: &str, context: &Value) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];

        let Some(end) = after_open.find("}}") else {
            // Unterminated placeholder; keep the tail as-is.
            out.push_str(&rest[start..]);
            return out;
        };

        let path = after_open[..end].trim();
        match lookup(context, path) {
            Some(value) if !value.is_null() => out.push_str(&stringify(value)),
            // Missing path (or a null along the way): keep the literal text.
            _ => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after_open[end + 2..];
    }

    out.push_str(rest);
    out
}

/// Walk `path` segment by segment. Objects are indexed by key, arrays by
/// numeric segment; any miss ends the walk.
fn lookup<'a>(context: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    let mut current = context;
    for segment in path.split('.') {
        current = match current {
            Value::Object(object) => object.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Strings substitute unquoted; everything else uses its JSON encoding.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
