//! Decoding rule records into in-memory rules.
//!
//! A record whose JSON-encoded `trigger` or `actions` cannot be decoded —
//! including a condition with an unknown operator — produces a
//! [`RuleLoadError`]; the rule is logged and skipped while the rest of the
//! set still loads.

use tracing::warn;

use crate::error::RuleLoadError;
use crate::models::{ActionDefinition, Rule, Trigger};
use crate::store::{RuleRecord, RuleStore};

/// Decode a single record.
pub fn decode_rule(record: &RuleRecord) -> Result<Rule, RuleLoadError> {
    let trigger: Trigger =
        serde_json::from_str(&record.trigger).map_err(|source| RuleLoadError::Trigger {
            rule_id: record.id.clone(),
            source,
        })?;
    let actions: Vec<ActionDefinition> =
        serde_json::from_str(&record.actions).map_err(|source| RuleLoadError::Actions {
            rule_id: record.id.clone(),
            source,
        })?;

    Ok(Rule {
        id: record.id.clone(),
        name: record.name.clone(),
        trigger,
        actions,
    })
}

/// Decode a record set, skipping (and warn-logging) malformed entries.
/// Order is preserved.
pub fn decode_rules(records: &[RuleRecord]) -> Vec<Rule> {
    records
        .iter()
        .filter_map(|record| match decode_rule(record) {
            Ok(rule) => Some(rule),
            Err(e) => {
                warn!(rule_id = %record.id, error = %e, "skipping malformed rule");
                None
            }
        })
        .collect()
}

/// Load and decode every rule the store holds.
pub async fn load_rules(store: &dyn RuleStore) -> Vec<Rule> {
    decode_rules(&store.load_all().await)
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, trigger: &str, actions: &str) -> RuleRecord {
        RuleRecord {
            id: id.to_string(),
            name: format!("rule {id}"),
            trigger: trigger.to_string(),
            actions: actions.to_string(),
        }
    }

    #[test]
    fn well_formed_records_decode() {
        let rule = decode_rule(&record(
            "r1",
            r#"{"type":"task:overdue","conditions":{"priority":{"gt":5}}}"#,
            r#"[{"id":"a1","type":"send-notification","params":{"userId":"u1","message":"m"}}]"#,
        ))
        .unwrap();

        assert_eq!(rule.trigger.event_type, "task:overdue");
        assert_eq!(rule.actions.len(), 1);
        assert_eq!(rule.actions[0].action_type, "send-notification");
    }

    #[test]
    fn malformed_records_are_skipped_but_the_rest_load() {
        let records = vec![
            record("good-1", r#"{"type":"task:created"}"#, "[]"),
            // Truncated trigger JSON.
            record("bad-syntax", r#"{"type":"task:creat"#, "[]"),
            // Unknown condition operator.
            record(
                "bad-operator",
                r#"{"type":"task:created","conditions":{"priority":{"matches":".*"}}}"#,
                "[]",
            ),
            // Actions must be a list.
            record("bad-actions", r#"{"type":"task:created"}"#, r#"{"id":"a1"}"#),
            record("good-2", r#"{"type":"user:inactive"}"#, "[]"),
        ];

        let rules = decode_rules(&records);
        assert_eq!(
            rules.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["good-1", "good-2"]
        );
    }

    #[test]
    fn load_errors_name_the_offending_rule() {
        let err = decode_rule(&record("r7", "not json", "[]")).unwrap_err();
        assert!(matches!(err, RuleLoadError::Trigger { ref rule_id, .. } if rule_id == "r7"));
        assert!(err.to_string().contains("r7"));
    }
}
