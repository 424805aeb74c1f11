//! Execution records and derived statistics types.

use std::collections::HashMap;

use actions::ActionResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle state of one workflow execution.
///
/// Transitions are `running → completed` or `running → failed`; both end
/// states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Event/user context captured when a rule fired.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionContextInfo {
    pub user_id: Option<String>,
    pub event_source: Option<String>,
    pub event_data: Map<String, Value>,
}

/// One runtime instance of a rule firing in response to one event.
///
/// Created by `WorkflowMonitor::start_execution`, mutated exactly once by
/// `complete_execution`, then immutable until evicted from the history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowExecution {
    pub id: String,
    pub rule_id: String,
    pub rule_name: String,
    pub event_type: String,
    pub triggered_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: ExecutionStatus,
    pub actions: Vec<ActionResult>,
    pub error: Option<String>,
    pub context: ExecutionContextInfo,
}

impl WorkflowExecution {
    /// Wall-clock completion time in milliseconds, when terminal.
    pub fn completion_ms(&self) -> Option<i64> {
        self.completed_at
            .map(|done| (done - self.triggered_at).num_milliseconds())
    }
}

/// Optional narrowing for history queries.
#[derive(Debug, Clone, Default)]
pub struct ExecutionFilter {
    pub status: Option<ExecutionStatus>,
    pub rule_id: Option<String>,
    pub event_type: Option<String>,
    pub user_id: Option<String>,
}

impl ExecutionFilter {
    pub(crate) fn accepts(&self, execution: &WorkflowExecution) -> bool {
        if let Some(status) = self.status {
            if execution.status != status {
                return false;
            }
        }
        if let Some(rule_id) = &self.rule_id {
            if &execution.rule_id != rule_id {
                return false;
            }
        }
        if let Some(event_type) = &self.event_type {
            if &execution.event_type != event_type {
                return false;
            }
        }
        if let Some(user_id) = &self.user_id {
            if execution.context.user_id.as_deref() != Some(user_id.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Aggregates over a time window of the execution history. Recomputed on
/// each query; never stored.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowStatistics {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub by_rule: HashMap<String, usize>,
    pub by_event_type: HashMap<String, usize>,
    pub by_status: HashMap<String, usize>,
    /// Mean wall-clock millis over `completed` executions only; 0.0 when
    /// there are none.
    pub average_completion_ms: f64,
    /// The 10 most recent failures in the window, newest first.
    pub recent_failures: Vec<WorkflowExecution>,
}
