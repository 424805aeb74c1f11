//! The `Action` trait — the contract every action must fulfil.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use crate::ActionError;

/// Shared context passed to every action during execution.
///
/// Defined here (in the actions crate) so both the engine and individual
/// action implementations can import it without a circular dependency.
#[derive(Debug, Clone)]
pub struct ActionContext {
    /// ID of the rule whose chain is being executed.
    pub rule_id: String,
    /// Human-readable name of that rule.
    pub rule_name: String,
    /// Type of the event that matched the rule, e.g. `task:overdue`.
    pub event_type: String,
    /// Payload of the matched event.
    pub event_data: Map<String, Value>,
    /// When the matched event occurred.
    pub event_timestamp: DateTime<Utc>,
    /// User the event is attributed to, when the payload names one.
    pub user_id: Option<String>,
    /// Domain service that emitted the event (`task`, `project`, `user`, …).
    pub event_source: Option<String>,
}

impl ActionContext {
    /// The JSON object that `{{dotted.path}}` placeholders in action params
    /// are resolved against.
    ///
    /// Shape:
    /// `event.type`, `event.data.*`, `event.timestamp`, `user.id`, `source`,
    /// `rule.id`, `rule.name`.
    pub fn template_root(&self) -> Value {
        let mut root = json!({
            "event": {
                "type": self.event_type,
                "data": Value::Object(self.event_data.clone()),
                "timestamp": self.event_timestamp.to_rfc3339(),
            },
            "rule": {
                "id": self.rule_id,
                "name": self.rule_name,
            },
        });
        if let Some(user_id) = &self.user_id {
            root["user"] = json!({ "id": user_id });
        }
        if let Some(source) = &self.event_source {
            root["source"] = json!(source);
        }
        root
    }
}

/// The core action trait.
#[async_trait]
pub trait Action: Send + Sync {
    /// Check `params` before execution, *prior* to template resolution.
    ///
    /// Returns one entry per problem found; an empty list means the params
    /// are acceptable.
    fn validate_params(&self, params: &Map<String, Value>) -> Vec<String>;

    /// Execute the action against the template-resolved `params`.
    ///
    /// `Ok` carries a JSON payload describing the effect; `Err` marks the
    /// attempt as failed and halts the rest of the chain.
    async fn execute(
        &self,
        ctx: &ActionContext,
        params: &Map<String, Value>,
    ) -> Result<Value, ActionError>;
}
