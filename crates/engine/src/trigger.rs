//! Trigger matching — decides whether an incoming event satisfies a rule's
//! trigger.
//!
//! Matching is pure and synchronous. The event type must equal the trigger
//! type exactly; only then are the field conditions evaluated, and every one
//! of them must hold. A condition against a missing or incomparable field is
//! simply not satisfied — matching never panics on odd payloads.

use std::cmp::Ordering;

use serde_json::Value;

use crate::models::{Condition, ConditionOp, Event, Trigger};

/// Does `event` satisfy `trigger`?
pub fn matches(event: &Event, trigger: &Trigger) -> bool {
    if event.event_type != trigger.event_type {
        return false;
    }
    // `all` stops at the first failed condition.
    trigger
        .conditions
        .iter()
        .all(|(field, condition)| condition_holds(event.data.get(field), condition))
}

fn condition_holds(actual: Option<&Value>, condition: &Condition) -> bool {
    match condition {
        Condition::Equals(expected) => actual == Some(expected),
        Condition::Op { op, operand } => {
            let Some(actual) = actual else {
                return false;
            };
            match op {
                ConditionOp::Gt => {
                    compare(actual, operand) == Some(Ordering::Greater)
                }
                ConditionOp::Gte => matches!(
                    compare(actual, operand),
                    Some(Ordering::Greater | Ordering::Equal)
                ),
                ConditionOp::Lt => compare(actual, operand) == Some(Ordering::Less),
                ConditionOp::Lte => matches!(
                    compare(actual, operand),
                    Some(Ordering::Less | Ordering::Equal)
                ),
                ConditionOp::Contains => contains(actual, operand),
                ConditionOp::In => contains(operand, actual),
            }
        }
    }
}

/// Ordering between two JSON values: numeric for number pairs, lexicographic
/// for string pairs, undefined otherwise.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => l.as_f64()?.partial_cmp(&r.as_f64()?),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

/// Is `needle` inside `container`? Element equality for arrays, substring
/// for strings; anything else is not container-like.
fn contains(container: &Value, needle: &Value) -> bool {
    match container {
        Value::Array(items) => items.contains(needle),
        Value::String(text) => needle.as_str().is_some_and(|n| text.contains(n)),
        _ => false,
    }
}
