//! Read-side derivations over the monitor's history.
//!
//! Everything here is recomputed from the current history on each call;
//! nothing is cached or persisted.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::execution::{ExecutionStatus, WorkflowExecution};
use crate::monitor::WorkflowMonitor;

/// Failure patterns group on at most this many characters of the error.
const FAILURE_PATTERN_PREFIX: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceMetrics {
    /// Completed / total over the window; 0.0 when the window is empty.
    pub success_rate: f64,
    /// Failed / total over the window; 0.0 when the window is empty.
    pub failure_rate: f64,
    pub average_execution_time_ms: f64,
    /// Executions per minute of window.
    pub throughput_per_minute: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleActivity {
    pub rule_id: String,
    pub rule_name: String,
    pub executions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventActivity {
    pub event_type: String,
    pub executions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailurePattern {
    pub pattern: String,
    pub occurrences: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleEfficiency {
    pub rule_id: String,
    pub rule_name: String,
    pub executions: usize,
    pub success_rate: f64,
    /// Mean wall-clock millis over completed executions only.
    pub average_completion_ms: f64,
}

/// Derives aggregate metrics and patterns from a [`WorkflowMonitor`].
pub struct WorkflowAnalytics {
    monitor: Arc<WorkflowMonitor>,
}

impl WorkflowAnalytics {
    pub fn new(monitor: Arc<WorkflowMonitor>) -> Self {
        Self { monitor }
    }

    pub async fn performance_metrics(&self, window: Duration) -> PerformanceMetrics {
        let stats = self.monitor.statistics(window).await;
        let total = stats.total as f64;

        let (success_rate, failure_rate) = if stats.total == 0 {
            (0.0, 0.0)
        } else {
            (stats.succeeded as f64 / total, stats.failed as f64 / total)
        };

        let minutes = window.as_secs_f64() / 60.0;
        let throughput_per_minute = if minutes > 0.0 { total / minutes } else { 0.0 };

        PerformanceMetrics {
            success_rate,
            failure_rate,
            average_execution_time_ms: stats.average_completion_ms,
            throughput_per_minute,
        }
    }

    /// Rules ordered by how often they fired, most active first.
    pub async fn most_active_rules(&self, limit: usize) -> Vec<RuleActivity> {
        let history = self.monitor.history().await;

        let mut counts: HashMap<String, RuleActivity> = HashMap::new();
        for execution in &history {
            counts
                .entry(execution.rule_id.clone())
                .or_insert_with(|| RuleActivity {
                    rule_id: execution.rule_id.clone(),
                    rule_name: execution.rule_name.clone(),
                    executions: 0,
                })
                .executions += 1;
        }

        let mut activity: Vec<RuleActivity> = counts.into_values().collect();
        activity.sort_by(|a, b| b.executions.cmp(&a.executions));
        activity.truncate(limit);
        activity
    }

    /// Event types ordered by how many executions they triggered.
    pub async fn most_triggered_events(&self, limit: usize) -> Vec<EventActivity> {
        let history = self.monitor.history().await;

        let mut counts: HashMap<String, usize> = HashMap::new();
        for execution in &history {
            *counts.entry(execution.event_type.clone()).or_insert(0) += 1;
        }

        let mut activity: Vec<EventActivity> = counts
            .into_iter()
            .map(|(event_type, executions)| EventActivity {
                event_type,
                executions,
            })
            .collect();
        activity.sort_by(|a, b| b.executions.cmp(&a.executions));
        activity.truncate(limit);
        activity
    }

    /// Failed executions grouped by the leading fragment of their error —
    /// the first line, truncated to 50 characters — most common first.
    pub async fn common_failure_patterns(&self) -> Vec<FailurePattern> {
        let history = self.monitor.history().await;

        let mut counts: HashMap<String, usize> = HashMap::new();
        for execution in &history {
            if execution.status != ExecutionStatus::Failed {
                continue;
            }
            let Some(error) = &execution.error else {
                continue;
            };
            let line = error.lines().next().unwrap_or("");
            let pattern: String = line.chars().take(FAILURE_PATTERN_PREFIX).collect();
            *counts.entry(pattern).or_insert(0) += 1;
        }

        let mut patterns: Vec<FailurePattern> = counts
            .into_iter()
            .map(|(pattern, occurrences)| FailurePattern {
                pattern,
                occurrences,
            })
            .collect();
        patterns.sort_by(|a, b| b.occurrences.cmp(&a.occurrences));
        patterns
    }

    /// Per-rule success rate and mean completion time, best-performing rules
    /// first. Rules with no executions are absent.
    pub async fn rule_efficiency_metrics(&self) -> Vec<RuleEfficiency> {
        let history = self.monitor.history().await;

        let mut grouped: HashMap<String, Vec<&WorkflowExecution>> = HashMap::new();
        for execution in &history {
            grouped
                .entry(execution.rule_id.clone())
                .or_default()
                .push(execution);
        }

        let mut efficiency: Vec<RuleEfficiency> = grouped
            .into_iter()
            .map(|(rule_id, executions)| {
                let total = executions.len();
                let succeeded = executions
                    .iter()
                    .filter(|e| e.status == ExecutionStatus::Completed)
                    .count();
                let completion_times: Vec<i64> = executions
                    .iter()
                    .filter(|e| e.status == ExecutionStatus::Completed)
                    .filter_map(|e| e.completion_ms())
                    .collect();
                let average_completion_ms = if completion_times.is_empty() {
                    0.0
                } else {
                    completion_times.iter().sum::<i64>() as f64 / completion_times.len() as f64
                };

                RuleEfficiency {
                    rule_id,
                    rule_name: executions[0].rule_name.clone(),
                    executions: total,
                    success_rate: succeeded as f64 / total as f64,
                    average_completion_ms,
                }
            })
            .collect();

        efficiency.sort_by(|a, b| {
            b.success_rate
                .partial_cmp(&a.success_rate)
                .unwrap_or(Ordering::Equal)
        });
        efficiency
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::ExecutionContextInfo;
    use chrono::{DateTime, Utc};

    fn execution(
        rule_id: &str,
        event_type: &str,
        status: ExecutionStatus,
        error: Option<&str>,
        triggered_at: DateTime<Utc>,
    ) -> WorkflowExecution {
        WorkflowExecution {
            id: uuid::Uuid::new_v4().to_string(),
            rule_id: rule_id.to_string(),
            rule_name: format!("rule {rule_id}"),
            event_type: event_type.to_string(),
            triggered_at,
            completed_at: match status {
                ExecutionStatus::Running => None,
                _ => Some(triggered_at + chrono::Duration::milliseconds(20)),
            },
            status,
            actions: Vec::new(),
            error: error.map(String::from),
            context: ExecutionContextInfo::default(),
        }
    }

    async fn seeded(counts: &[(&str, usize)]) -> Arc<WorkflowMonitor> {
        let monitor = Arc::new(WorkflowMonitor::new(10_000));
        for (rule_id, n) in counts {
            for _ in 0..*n {
                monitor
                    .insert(execution(
                        rule_id,
                        "task:created",
                        ExecutionStatus::Completed,
                        None,
                        Utc::now(),
                    ))
                    .await;
            }
        }
        monitor
    }

    #[tokio::test]
    async fn empty_window_metrics_are_zero_not_nan() {
        let monitor = Arc::new(WorkflowMonitor::new(100));
        let analytics = WorkflowAnalytics::new(monitor);

        let metrics = analytics.performance_metrics(Duration::from_secs(60)).await;
        assert_eq!(metrics.success_rate, 0.0);
        assert_eq!(metrics.failure_rate, 0.0);
        assert_eq!(metrics.average_execution_time_ms, 0.0);
        assert_eq!(metrics.throughput_per_minute, 0.0);
    }

    #[tokio::test]
    async fn performance_metrics_split_success_and_failure() {
        let monitor = Arc::new(WorkflowMonitor::new(100));
        let now = Utc::now();
        monitor
            .insert(execution("r1", "task:created", ExecutionStatus::Completed, None, now))
            .await;
        monitor
            .insert(execution("r1", "task:created", ExecutionStatus::Completed, None, now))
            .await;
        monitor
            .insert(execution("r1", "task:created", ExecutionStatus::Failed, Some("x"), now))
            .await;
        monitor
            .insert(execution("r1", "task:created", ExecutionStatus::Failed, Some("x"), now))
            .await;

        let analytics = WorkflowAnalytics::new(monitor);
        let metrics = analytics.performance_metrics(Duration::from_secs(120)).await;
        assert_eq!(metrics.success_rate, 0.5);
        assert_eq!(metrics.failure_rate, 0.5);
        assert_eq!(metrics.throughput_per_minute, 2.0);
    }

    #[tokio::test]
    async fn most_active_rules_sorts_and_truncates() {
        let monitor = seeded(&[("r1", 5), ("r2", 12), ("r3", 3)]).await;
        let analytics = WorkflowAnalytics::new(monitor);

        let top = analytics.most_active_rules(2).await;
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].rule_id, "r2");
        assert_eq!(top[0].executions, 12);
        assert_eq!(top[1].rule_id, "r1");
        assert_eq!(top[1].executions, 5);
    }

    #[tokio::test]
    async fn most_triggered_events_counts_by_type() {
        let monitor = Arc::new(WorkflowMonitor::new(100));
        let now = Utc::now();
        for event_type in ["task:overdue", "task:overdue", "user:inactive"] {
            monitor
                .insert(execution("r1", event_type, ExecutionStatus::Completed, None, now))
                .await;
        }

        let analytics = WorkflowAnalytics::new(monitor);
        let top = analytics.most_triggered_events(5).await;
        assert_eq!(top[0].event_type, "task:overdue");
        assert_eq!(top[0].executions, 2);
        assert_eq!(top[1].executions, 1);
    }

    #[tokio::test]
    async fn failure_patterns_group_on_the_first_line_capped_at_50_chars() {
        let monitor = Arc::new(WorkflowMonitor::new(100));
        let now = Utc::now();
        let long = format!("{}-tail-that-differs-1\nsecond line", "x".repeat(50));
        let long2 = format!("{}-tail-that-differs-2\nother", "x".repeat(50));

        for error in [long.as_str(), long2.as_str(), "timeout", "timeout\nat step 3"] {
            monitor
                .insert(execution("r1", "task:created", ExecutionStatus::Failed, Some(error), now))
                .await;
        }
        // Non-failures never contribute a pattern.
        monitor
            .insert(execution("r1", "task:created", ExecutionStatus::Completed, None, now))
            .await;

        let analytics = WorkflowAnalytics::new(monitor);
        let patterns = analytics.common_failure_patterns().await;

        assert_eq!(patterns.len(), 2);
        // The two long errors share their first 50 characters.
        assert_eq!(patterns[0].occurrences, 2);
        assert_eq!(patterns[1].occurrences, 2);
        assert!(patterns.iter().any(|p| p.pattern == "x".repeat(50)));
        assert!(patterns.iter().any(|p| p.pattern == "timeout"));
    }

    #[tokio::test]
    async fn rule_efficiency_sorts_by_success_rate() {
        let monitor = Arc::new(WorkflowMonitor::new(100));
        let now = Utc::now();

        // r1: 1/2 succeed; r2: 2/2 succeed.
        monitor
            .insert(execution("r1", "task:created", ExecutionStatus::Completed, None, now))
            .await;
        monitor
            .insert(execution("r1", "task:created", ExecutionStatus::Failed, Some("x"), now))
            .await;
        monitor
            .insert(execution("r2", "task:created", ExecutionStatus::Completed, None, now))
            .await;
        monitor
            .insert(execution("r2", "task:created", ExecutionStatus::Completed, None, now))
            .await;

        let analytics = WorkflowAnalytics::new(monitor);
        let efficiency = analytics.rule_efficiency_metrics().await;

        assert_eq!(efficiency.len(), 2);
        assert_eq!(efficiency[0].rule_id, "r2");
        assert_eq!(efficiency[0].success_rate, 1.0);
        assert_eq!(efficiency[1].rule_id, "r1");
        assert_eq!(efficiency[1].success_rate, 0.5);
        assert_eq!(efficiency[1].average_completion_ms, 20.0);
    }
}
