//! The workflow monitor — bounded execution history and its query surface.

use std::collections::HashMap;
use std::time::Duration;

use actions::ActionResult;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::execution::{
    ExecutionContextInfo, ExecutionFilter, ExecutionStatus, WorkflowExecution, WorkflowStatistics,
};

/// Default history cap.
pub const DEFAULT_MAX_HISTORY: usize = 1000;

/// How many failures `statistics` reports.
const RECENT_FAILURE_COUNT: usize = 10;

/// Records execution lifecycles into a bounded in-memory history.
///
/// The history list is the engine's only shared mutable state; all access
/// goes through the `RwLock` so the cap invariant holds under concurrent
/// `start_execution` calls.
pub struct WorkflowMonitor {
    max_history: usize,
    executions: RwLock<Vec<WorkflowExecution>>,
}

impl WorkflowMonitor {
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history,
            executions: RwLock::new(Vec::new()),
        }
    }

    /// Record a new `running` execution for a matched rule; returns its id.
    pub async fn start_execution(
        &self,
        rule_id: &str,
        rule_name: &str,
        event_type: &str,
        context: ExecutionContextInfo,
    ) -> String {
        let execution = WorkflowExecution {
            id: Uuid::new_v4().to_string(),
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            event_type: event_type.to_string(),
            triggered_at: Utc::now(),
            completed_at: None,
            status: ExecutionStatus::Running,
            actions: Vec::new(),
            error: None,
            context,
        };
        let id = execution.id.clone();
        debug!(execution_id = %id, rule_id = %rule_id, "execution started");
        self.insert(execution).await;
        id
    }

    /// Append an execution and enforce the history cap: when the list
    /// overflows, the oldest `triggered_at` entries are dropped first.
    pub(crate) async fn insert(&self, execution: WorkflowExecution) {
        let mut executions = self.executions.write().await;
        executions.push(execution);

        if executions.len() > self.max_history {
            // Stable sort: equal timestamps keep insertion order.
            executions.sort_by(|a, b| a.triggered_at.cmp(&b.triggered_at));
            let excess = executions.len() - self.max_history;
            executions.drain(..excess);
        }
    }

    /// Finish a `running` execution. Unknown ids and already-terminal
    /// records are left untouched and logged as anomalies.
    pub async fn complete_execution(
        &self,
        execution_id: &str,
        actions: Vec<ActionResult>,
        success: bool,
        error: Option<String>,
    ) {
        let mut executions = self.executions.write().await;
        let Some(execution) = executions.iter_mut().find(|e| e.id == execution_id) else {
            warn!(execution_id = %execution_id, "completion for unknown execution id ignored");
            return;
        };
        if execution.status != ExecutionStatus::Running {
            warn!(
                execution_id = %execution_id,
                status = %execution.status,
                "completion for already-terminal execution ignored"
            );
            return;
        }

        execution.completed_at = Some(Utc::now());
        execution.status = if success {
            ExecutionStatus::Completed
        } else {
            ExecutionStatus::Failed
        };
        execution.actions = actions;
        execution.error = error;
    }

    pub async fn get_execution(&self, execution_id: &str) -> Option<WorkflowExecution> {
        let executions = self.executions.read().await;
        executions.iter().find(|e| e.id == execution_id).cloned()
    }

    /// The most recent executions (newest `triggered_at` first), optionally
    /// narrowed by `filter`.
    pub async fn recent_executions(
        &self,
        limit: usize,
        filter: Option<ExecutionFilter>,
    ) -> Vec<WorkflowExecution> {
        let executions = self.executions.read().await;
        let filter = filter.unwrap_or_default();

        let mut matching: Vec<WorkflowExecution> = executions
            .iter()
            .filter(|e| filter.accepts(e))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.triggered_at.cmp(&a.triggered_at));
        matching.truncate(limit);
        matching
    }

    pub async fn executions_by_rule(&self, rule_id: &str, limit: usize) -> Vec<WorkflowExecution> {
        let filter = ExecutionFilter {
            rule_id: Some(rule_id.to_string()),
            ..Default::default()
        };
        self.recent_executions(limit, Some(filter)).await
    }

    pub async fn executions_by_event_type(
        &self,
        event_type: &str,
        limit: usize,
    ) -> Vec<WorkflowExecution> {
        let filter = ExecutionFilter {
            event_type: Some(event_type.to_string()),
            ..Default::default()
        };
        self.recent_executions(limit, Some(filter)).await
    }

    pub async fn executions_by_user(&self, user_id: &str, limit: usize) -> Vec<WorkflowExecution> {
        let filter = ExecutionFilter {
            user_id: Some(user_id.to_string()),
            ..Default::default()
        };
        self.recent_executions(limit, Some(filter)).await
    }

    pub async fn failed_executions(&self, limit: usize) -> Vec<WorkflowExecution> {
        let filter = ExecutionFilter {
            status: Some(ExecutionStatus::Failed),
            ..Default::default()
        };
        self.recent_executions(limit, Some(filter)).await
    }

    /// Aggregate statistics over executions triggered within the last
    /// `window`.
    pub async fn statistics(&self, window: Duration) -> WorkflowStatistics {
        let window = chrono::Duration::from_std(window).unwrap_or(chrono::Duration::MAX);
        let cutoff = Utc::now()
            .checked_sub_signed(window)
            .unwrap_or(chrono::DateTime::<Utc>::MIN_UTC);

        let executions = self.executions.read().await;
        let windowed: Vec<&WorkflowExecution> = executions
            .iter()
            .filter(|e| e.triggered_at >= cutoff)
            .collect();

        let mut by_rule: HashMap<String, usize> = HashMap::new();
        let mut by_event_type: HashMap<String, usize> = HashMap::new();
        let mut by_status: HashMap<String, usize> = HashMap::new();
        for execution in &windowed {
            *by_rule.entry(execution.rule_id.clone()).or_insert(0) += 1;
            *by_event_type
                .entry(execution.event_type.clone())
                .or_insert(0) += 1;
            *by_status.entry(execution.status.to_string()).or_insert(0) += 1;
        }

        let completion_times: Vec<i64> = windowed
            .iter()
            .filter(|e| e.status == ExecutionStatus::Completed)
            .filter_map(|e| e.completion_ms())
            .collect();
        let average_completion_ms = if completion_times.is_empty() {
            0.0
        } else {
            completion_times.iter().sum::<i64>() as f64 / completion_times.len() as f64
        };

        let mut failures: Vec<WorkflowExecution> = windowed
            .iter()
            .filter(|e| e.status == ExecutionStatus::Failed)
            .map(|e| (*e).clone())
            .collect();
        failures.sort_by(|a, b| b.triggered_at.cmp(&a.triggered_at));
        failures.truncate(RECENT_FAILURE_COUNT);

        WorkflowStatistics {
            total: windowed.len(),
            succeeded: windowed
                .iter()
                .filter(|e| e.status == ExecutionStatus::Completed)
                .count(),
            failed: windowed
                .iter()
                .filter(|e| e.status == ExecutionStatus::Failed)
                .count(),
            by_rule,
            by_event_type,
            by_status,
            average_completion_ms,
            recent_failures: failures,
        }
    }

    /// Full history snapshot, insertion-ordered. Read side of the analytics
    /// queries.
    pub(crate) async fn history(&self) -> Vec<WorkflowExecution> {
        self.executions.read().await.clone()
    }
}

impl Default for WorkflowMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}
