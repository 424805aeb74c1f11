//! `schedule-reminder` — time-delayed re-entry into the notification action.
//!
//! The action never blocks the calling chain: it computes the fire time,
//! detaches a timer task and returns immediately. The detached task owns
//! clones of everything it needs; no chain-local state survives the delay.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use super::{require_str, str_param};
use crate::{Action, ActionContext, ActionError};

/// `schedule-reminder` — requires `userId`, `message` and a numeric
/// `delayMs`; forwards `userId`/`message` to the wrapped notification action
/// once the delay elapses.
pub struct ScheduleReminderAction {
    notification: Arc<dyn Action>,
}

impl ScheduleReminderAction {
    pub fn new(notification: Arc<dyn Action>) -> Self {
        Self { notification }
    }
}

#[async_trait]
impl Action for ScheduleReminderAction {
    fn validate_params(&self, params: &Map<String, Value>) -> Vec<String> {
        let mut problems = Vec::new();
        require_str(params, "userId", &mut problems);
        require_str(params, "message", &mut problems);
        match params.get("delayMs") {
            None => problems.push("missing required param 'delayMs'".into()),
            Some(value) if value.as_u64().is_none() => {
                problems.push("param 'delayMs' must be a non-negative integer".into())
            }
            Some(_) => {}
        }
        problems
    }

    async fn execute(
        &self,
        ctx: &ActionContext,
        params: &Map<String, Value>,
    ) -> Result<Value, ActionError> {
        let delay_ms = params.get("delayMs").and_then(Value::as_u64).ok_or_else(|| {
            ActionError::Execution("param 'delayMs' is not a non-negative integer".into())
        })?;
        let user_id = str_param(params, "userId")
            .ok_or_else(|| ActionError::Execution("param 'userId' is not a string".into()))?;

        let fire_at = Utc::now() + chrono::Duration::milliseconds(delay_ms as i64);
        info!(
            user_id = %user_id,
            fire_at = %fire_at.to_rfc3339(),
            rule_id = %ctx.rule_id,
            "scheduling reminder"
        );

        let notification = Arc::clone(&self.notification);
        let ctx = ctx.clone();
        let mut forwarded = params.clone();
        forwarded.remove("delayMs");

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            if let Err(e) = notification.execute(&ctx, &forwarded).await {
                error!(rule_id = %ctx.rule_id, error = %e, "scheduled reminder failed");
            }
        });

        Ok(json!({
            "scheduled": true,
            "scheduledFor": fire_at.to_rfc3339(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::notify::SendNotificationAction;
    use crate::mock::RecordingSink;

    fn ctx() -> ActionContext {
        ActionContext {
            rule_id: "r1".into(),
            rule_name: "reminder rule".into(),
            event_type: "task:overdue".into(),
            event_data: Map::new(),
            event_timestamp: Utc::now(),
            user_id: Some("u1".into()),
            event_source: Some("task".into()),
        }
    }

    #[test]
    fn delay_must_be_a_non_negative_integer() {
        let action = ScheduleReminderAction::new(Arc::new(SendNotificationAction::new(
            Arc::new(RecordingSink::default()),
        )));
        let params = json!({ "userId": "u1", "message": "m", "delayMs": -5 });
        let problems = action.validate_params(params.as_object().unwrap());
        assert_eq!(problems, vec!["param 'delayMs' must be a non-negative integer"]);
    }

    #[tokio::test(start_paused = true)]
    async fn reminder_fires_after_the_delay_without_blocking() {
        let sink = Arc::new(RecordingSink::default());
        let action = ScheduleReminderAction::new(Arc::new(SendNotificationAction::new(
            sink.clone(),
        )));

        let params = json!({ "userId": "u1", "message": "stand-up in 10", "delayMs": 60_000 });
        let out = action
            .execute(&ctx(), params.as_object().unwrap())
            .await
            .unwrap();

        // Returned immediately; nothing delivered yet.
        assert_eq!(out["scheduled"], true);
        assert!(sink.delivered().is_empty());

        tokio::time::sleep(Duration::from_millis(60_001)).await;
        // Let the detached task run.
        tokio::task::yield_now().await;

        assert_eq!(
            sink.delivered(),
            vec![("u1".to_string(), "stand-up in 10".to_string())]
        );
    }
}
