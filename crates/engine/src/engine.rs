//! The rule engine orchestrator.
//!
//! For each incoming event the engine walks the rule set in load order,
//! matches triggers, and runs each matched rule's action chain, bracketing
//! every chain with the monitor's start/complete calls. One rule's failure
//! never stops other rules from being evaluated against the same event, and
//! `process_event` never returns an error to its caller — all failure detail
//! lands in the monitor's execution records.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};

use actions::ActionContext;
use monitor::{ExecutionContextInfo, WorkflowMonitor};

use crate::executor::ActionExecutor;
use crate::loader;
use crate::models::{Event, Rule};
use crate::store::RuleStore;
use crate::trigger;

/// Orchestrates rule evaluation and chain execution for incoming events.
///
/// Construct with explicit collaborators; the engine holds no global state.
/// Rule definitions are read-only snapshots per processing pass.
pub struct RuleEngine {
    rules: RwLock<Vec<Rule>>,
    executor: ActionExecutor,
    monitor: Arc<WorkflowMonitor>,
}

impl RuleEngine {
    pub fn new(executor: ActionExecutor, monitor: Arc<WorkflowMonitor>) -> Self {
        Self {
            rules: RwLock::new(Vec::new()),
            executor,
            monitor,
        }
    }

    /// Replace the rule set with the store's decoded contents. Malformed
    /// records are skipped by the loader; returns how many rules loaded.
    pub async fn load_from_store(&self, store: &dyn RuleStore) -> usize {
        let rules = loader::load_rules(store).await;
        let count = rules.len();
        info!(count = count, "rules loaded");
        *self.rules.write().await = rules;
        count
    }

    /// Append a single already-decoded rule (evaluated after existing ones).
    pub async fn insert_rule(&self, rule: Rule) {
        self.rules.write().await.push(rule);
    }

    /// Current rule snapshot, in evaluation order.
    pub async fn rules(&self) -> Vec<Rule> {
        self.rules.read().await.clone()
    }

    /// Evaluate every rule against `event`; returns the execution ids of the
    /// matched rules, in evaluation order. Never fails: per-rule and
    /// per-action problems are captured in the execution records.
    pub async fn process_event(&self, event: &Event) -> Vec<String> {
        let rules = self.rules.read().await.clone();
        let mut execution_ids = Vec::new();

        for rule in &rules {
            if !trigger::matches(event, &rule.trigger) {
                continue;
            }
            debug!(
                rule_id = %rule.id,
                rule_name = %rule.name,
                event_type = %event.event_type,
                "rule matched"
            );

            let ctx = build_context(rule, event);
            let context_info = ExecutionContextInfo {
                user_id: ctx.user_id.clone(),
                event_source: ctx.event_source.clone(),
                event_data: event.data.clone(),
            };

            let execution_id = self
                .monitor
                .start_execution(&rule.id, &rule.name, &event.event_type, context_info)
                .await;

            let results = self.executor.execute_chain(&rule.actions, &ctx).await;

            let success = results.iter().all(|r| r.success);
            let error = results
                .iter()
                .find(|r| !r.success)
                .and_then(|r| r.message.clone());
            self.monitor
                .complete_execution(&execution_id, results, success, error)
                .await;

            execution_ids.push(execution_id);
        }

        execution_ids
    }

    /// Drain events from a bus receiver until the senders are gone.
    pub async fn run(&self, mut events: mpsc::Receiver<Event>) {
        while let Some(event) = events.recv().await {
            self.process_event(&event).await;
        }
    }
}

/// Event/user context for one matched rule's chain. The user is taken from
/// the payload's `userId`, the source from the event type's namespace
/// (`task:overdue` → `task`).
fn build_context(rule: &Rule, event: &Event) -> ActionContext {
    let user_id = event
        .data
        .get("userId")
        .and_then(Value::as_str)
        .map(String::from);
    let event_source = event
        .event_type
        .split_once(':')
        .map(|(source, _)| source.to_string());

    ActionContext {
        rule_id: rule.id.clone(),
        rule_name: rule.name.clone(),
        event_type: event.event_type.clone(),
        event_data: event.data.clone(),
        event_timestamp: event.timestamp,
        user_id,
        event_source,
    }
}
