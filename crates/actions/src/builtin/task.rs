//! Task-manipulating built-ins: `create-task`, `update-task-status`,
//! `assign-task`.
//!
//! Persistence of the task entities themselves is a collaborator concern;
//! each action here composes and returns the effect payload the surrounding
//! application applies to its store.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::info;
use uuid::Uuid;

use super::{require_str, str_param};
use crate::{Action, ActionContext, ActionError};

/// `create-task` — requires `title`; carries through the optional
/// `description`, `projectId`, `assigneeId`, `priority` and `dueDate` params.
pub struct CreateTaskAction;

#[async_trait]
impl Action for CreateTaskAction {
    fn validate_params(&self, params: &Map<String, Value>) -> Vec<String> {
        let mut problems = Vec::new();
        require_str(params, "title", &mut problems);
        problems
    }

    async fn execute(
        &self,
        ctx: &ActionContext,
        params: &Map<String, Value>,
    ) -> Result<Value, ActionError> {
        let title = str_param(params, "title")
            .ok_or_else(|| ActionError::Execution("param 'title' is not a string".into()))?;

        let task_id = Uuid::new_v4().to_string();
        info!(task_id = %task_id, title = %title, rule_id = %ctx.rule_id, "creating task");

        let mut task = json!({
            "taskId": task_id,
            "title": title,
            "createdAt": Utc::now().to_rfc3339(),
        });
        for key in ["description", "projectId", "assigneeId", "priority", "dueDate"] {
            if let Some(value) = params.get(key) {
                task[key] = value.clone();
            }
        }
        Ok(task)
    }
}

/// `update-task-status` — requires `taskId` and `status`.
pub struct UpdateTaskStatusAction;

#[async_trait]
impl Action for UpdateTaskStatusAction {
    fn validate_params(&self, params: &Map<String, Value>) -> Vec<String> {
        let mut problems = Vec::new();
        require_str(params, "taskId", &mut problems);
        require_str(params, "status", &mut problems);
        problems
    }

    async fn execute(
        &self,
        _ctx: &ActionContext,
        params: &Map<String, Value>,
    ) -> Result<Value, ActionError> {
        let task_id = str_param(params, "taskId")
            .ok_or_else(|| ActionError::Execution("param 'taskId' is not a string".into()))?;
        let status = str_param(params, "status")
            .ok_or_else(|| ActionError::Execution("param 'status' is not a string".into()))?;

        info!(task_id = %task_id, status = %status, "updating task status");

        Ok(json!({
            "taskId": task_id,
            "status": status,
            "updatedAt": Utc::now().to_rfc3339(),
        }))
    }
}

/// `assign-task` — requires `taskId` and `userId`.
pub struct AssignTaskAction;

#[async_trait]
impl Action for AssignTaskAction {
    fn validate_params(&self, params: &Map<String, Value>) -> Vec<String> {
        let mut problems = Vec::new();
        require_str(params, "taskId", &mut problems);
        require_str(params, "userId", &mut problems);
        problems
    }

    async fn execute(
        &self,
        _ctx: &ActionContext,
        params: &Map<String, Value>,
    ) -> Result<Value, ActionError> {
        let task_id = str_param(params, "taskId")
            .ok_or_else(|| ActionError::Execution("param 'taskId' is not a string".into()))?;
        let user_id = str_param(params, "userId")
            .ok_or_else(|| ActionError::Execution("param 'userId' is not a string".into()))?;

        info!(task_id = %task_id, user_id = %user_id, "assigning task");

        Ok(json!({
            "taskId": task_id,
            "assigneeId": user_id,
            "assignedAt": Utc::now().to_rfc3339(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> ActionContext {
        ActionContext {
            rule_id: "r1".into(),
            rule_name: "test rule".into(),
            event_type: "task:created".into(),
            event_data: Map::new(),
            event_timestamp: Utc::now(),
            user_id: None,
            event_source: None,
        }
    }

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn create_task_requires_title() {
        let problems = CreateTaskAction.validate_params(&params(json!({})));
        assert_eq!(problems, vec!["missing required param 'title'"]);

        let problems = CreateTaskAction.validate_params(&params(json!({ "title": 7 })));
        assert_eq!(problems, vec!["param 'title' must be a string"]);

        assert!(CreateTaskAction
            .validate_params(&params(json!({ "title": "fix login" })))
            .is_empty());
    }

    #[tokio::test]
    async fn create_task_carries_optional_params_through() {
        let out = CreateTaskAction
            .execute(
                &ctx(),
                &params(json!({ "title": "fix login", "priority": 8, "projectId": "p1" })),
            )
            .await
            .unwrap();

        assert_eq!(out["title"], "fix login");
        assert_eq!(out["priority"], 8);
        assert_eq!(out["projectId"], "p1");
        assert!(out["taskId"].as_str().is_some());
    }

    #[test]
    fn update_status_reports_every_missing_param() {
        let problems = UpdateTaskStatusAction.validate_params(&params(json!({})));
        assert_eq!(problems.len(), 2);
    }

    #[tokio::test]
    async fn assign_task_echoes_assignment() {
        let out = AssignTaskAction
            .execute(&ctx(), &params(json!({ "taskId": "t1", "userId": "u1" })))
            .await
            .unwrap();
        assert_eq!(out["taskId"], "t1");
        assert_eq!(out["assigneeId"], "u1");
    }
}
