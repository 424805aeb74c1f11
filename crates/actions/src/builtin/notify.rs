//! `send-notification` and the delivery boundary.
//!
//! Delivery mechanics (mail, chat, push, …) live outside the engine; the
//! action composes the message and hands it to whatever [`NotificationSink`]
//! was injected at registry construction time.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::info;

use super::{require_str, str_param};
use crate::{Action, ActionContext, ActionError};

/// A composed notification ready for delivery.
#[derive(Debug, Clone)]
pub struct Notification {
    pub user_id: String,
    pub message: String,
}

/// Delivery boundary for notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> anyhow::Result<()>;
}

/// Default sink: writes the notification to the log and nothing else.
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(&self, notification: &Notification) -> anyhow::Result<()> {
        info!(
            user_id = %notification.user_id,
            message = %notification.message,
            "notification"
        );
        Ok(())
    }
}

/// `send-notification` — requires `userId` and `message`.
pub struct SendNotificationAction {
    sink: Arc<dyn NotificationSink>,
}

impl SendNotificationAction {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl Action for SendNotificationAction {
    fn validate_params(&self, params: &Map<String, Value>) -> Vec<String> {
        let mut problems = Vec::new();
        require_str(params, "userId", &mut problems);
        require_str(params, "message", &mut problems);
        problems
    }

    async fn execute(
        &self,
        _ctx: &ActionContext,
        params: &Map<String, Value>,
    ) -> Result<Value, ActionError> {
        let user_id = str_param(params, "userId")
            .ok_or_else(|| ActionError::Execution("param 'userId' is not a string".into()))?;
        let message = str_param(params, "message")
            .ok_or_else(|| ActionError::Execution("param 'message' is not a string".into()))?;

        let notification = Notification {
            user_id: user_id.to_string(),
            message: message.to_string(),
        };
        self.sink
            .deliver(&notification)
            .await
            .map_err(|e| ActionError::Execution(format!("notification delivery failed: {e}")))?;

        Ok(json!({
            "userId": user_id,
            "message": message,
            "sentAt": Utc::now().to_rfc3339(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::RecordingSink;

    fn ctx() -> ActionContext {
        ActionContext {
            rule_id: "r1".into(),
            rule_name: "notify rule".into(),
            event_type: "task:overdue".into(),
            event_data: Map::new(),
            event_timestamp: Utc::now(),
            user_id: Some("u1".into()),
            event_source: Some("task".into()),
        }
    }

    #[test]
    fn missing_params_are_all_reported() {
        let action = SendNotificationAction::new(Arc::new(LogSink));
        let problems = action.validate_params(&Map::new());
        assert_eq!(
            problems,
            vec![
                "missing required param 'userId'",
                "missing required param 'message'"
            ]
        );
    }

    #[tokio::test]
    async fn delivers_through_the_sink() {
        let sink = Arc::new(RecordingSink::default());
        let action = SendNotificationAction::new(sink.clone());

        let params = serde_json::json!({ "userId": "u1", "message": "task overdue" });
        let out = action
            .execute(&ctx(), params.as_object().unwrap())
            .await
            .unwrap();

        assert_eq!(out["userId"], "u1");
        assert_eq!(sink.delivered(), vec![("u1".to_string(), "task overdue".to_string())]);
    }

    #[tokio::test]
    async fn sink_failure_becomes_an_execution_error() {
        let sink = Arc::new(RecordingSink::rejecting("smtp down"));
        let action = SendNotificationAction::new(sink);

        let params = serde_json::json!({ "userId": "u1", "message": "hi" });
        let err = action
            .execute(&ctx(), params.as_object().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Execution(_)));
    }
}
