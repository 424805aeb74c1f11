//! The rule store collaborator.
//!
//! Rules are persisted with their `trigger` and `actions` fields
//! JSON-encoded; the engine decodes them at load time and whenever a rule
//! is created (see `loader.rs`). The in-memory implementation preserves
//! insertion order — the engine evaluates rules in load order and never
//! re-sorts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::models::{ActionDefinition, Rule, Trigger};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A rule as the store keeps it. Carries no domain behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleRecord {
    pub id: String,
    pub name: String,
    /// JSON-encoded [`Trigger`].
    pub trigger: String,
    /// JSON-encoded `Vec<ActionDefinition>`.
    pub actions: String,
}

/// Input for creating a rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRule {
    pub name: String,
    pub trigger: Trigger,
    pub actions: Vec<ActionDefinition>,
}

// ---------------------------------------------------------------------------
// RuleStore
// ---------------------------------------------------------------------------

/// Supplier of rule definitions. The engine only ever reads records and
/// hands back created rules; rule mutation lives behind this boundary.
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Every record, in insertion order.
    async fn load_all(&self) -> Vec<RuleRecord>;

    /// Persist a new rule and return its decoded in-memory shape.
    async fn create(&self, rule: NewRule) -> Result<Rule, serde_json::Error>;

    async fn get(&self, rule_id: &str) -> Option<RuleRecord>;
}

/// Insertion-ordered in-memory store.
#[derive(Default)]
pub struct InMemoryRuleStore {
    records: RwLock<Vec<RuleRecord>>,
}

impl InMemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with `records`, e.g. from a rules file.
    pub fn seeded(records: Vec<RuleRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl RuleStore for InMemoryRuleStore {
    async fn load_all(&self) -> Vec<RuleRecord> {
        self.records.read().await.clone()
    }

    async fn create(&self, rule: NewRule) -> Result<Rule, serde_json::Error> {
        let record = RuleRecord {
            id: Uuid::new_v4().to_string(),
            name: rule.name.clone(),
            trigger: serde_json::to_string(&rule.trigger)?,
            actions: serde_json::to_string(&rule.actions)?,
        };

        let created = Rule {
            id: record.id.clone(),
            name: rule.name,
            trigger: rule.trigger,
            actions: rule.actions,
        };

        info!(rule_id = %record.id, rule_name = %record.name, "rule created");
        self.records.write().await.push(record);
        Ok(created)
    }

    async fn get(&self, rule_id: &str) -> Option<RuleRecord> {
        let records = self.records.read().await;
        records.iter().find(|r| r.id == rule_id).cloned()
    }
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::decode_rule;
    use serde_json::json;

    fn new_rule(name: &str) -> NewRule {
        NewRule {
            name: name.to_string(),
            trigger: serde_json::from_value(json!({
                "type": "task:created",
                "conditions": { "priority": { "gte": 5 } }
            }))
            .unwrap(),
            actions: vec![ActionDefinition {
                id: "a1".into(),
                action_type: "create-task".into(),
                params: json!({ "title": "t" }).as_object().cloned().unwrap(),
            }],
        }
    }

    #[tokio::test]
    async fn created_rules_round_trip_through_their_record() {
        let store = InMemoryRuleStore::new();
        let created = store.create(new_rule("escalate")).await.unwrap();

        let record = store.get(&created.id).await.unwrap();
        let decoded = decode_rule(&record).unwrap();
        assert_eq!(decoded, created);
    }

    #[tokio::test]
    async fn load_all_preserves_insertion_order() {
        let store = InMemoryRuleStore::new();
        let first = store.create(new_rule("first")).await.unwrap();
        let second = store.create(new_rule("second")).await.unwrap();

        let records = store.load_all().await;
        assert_eq!(
            records.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec![first.id.as_str(), second.id.as_str()]
        );
    }
}
