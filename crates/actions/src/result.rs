//! Per-attempt action result record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The outcome of one action attempt. Produced once per attempt, then
/// immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    /// ID of the `ActionDefinition` this attempt belongs to.
    pub action_id: String,
    /// Failure description, or an informational note on success.
    pub message: Option<String>,
    /// Effect payload returned by the action.
    pub data: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

impl ActionResult {
    pub fn success(action_id: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            action_id: action_id.into(),
            message: None,
            data: Some(data),
            timestamp: Utc::now(),
        }
    }

    pub fn failure(action_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            action_id: action_id.into(),
            message: Some(message.into()),
            data: None,
            timestamp: Utc::now(),
        }
    }
}
