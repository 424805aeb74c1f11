//! Core domain models for the workflow automation engine.
//!
//! These types are the source of truth for what a rule looks like in
//! memory. The rule store keeps `trigger` and `actions` JSON-encoded; the
//! loader decodes them into these shapes (see `loader.rs`).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Condition
// ---------------------------------------------------------------------------

/// Comparison operator of an operator-form condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionOp {
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    In,
}

impl ConditionOp {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "contains" => Some(Self::Contains),
            "in" => Some(Self::In),
            _ => None,
        }
    }

    pub fn as_key(&self) -> &'static str {
        match self {
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Contains => "contains",
            Self::In => "in",
        }
    }
}

/// A single field-level test inside a trigger.
///
/// The JSON form is either a plain value (strict equality) or a single-key
/// operator object such as `{"gt": 5}`. A single-key object whose key is
/// not a known operator is rejected at decode time.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Strict equality with the event field.
    Equals(Value),
    /// Operator comparison against the event field.
    Op { op: ConditionOp, operand: Value },
}

impl Condition {
    fn from_value(value: Value) -> Result<Self, String> {
        if let Value::Object(map) = &value {
            if map.len() == 1 {
                let (key, operand) = map
                    .iter()
                    .next()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .unwrap_or_default();
                return match ConditionOp::from_key(&key) {
                    Some(op) => Ok(Condition::Op { op, operand }),
                    None => Err(format!("unknown condition operator '{key}'")),
                };
            }
        }
        Ok(Condition::Equals(value))
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Condition::from_value(value).map_err(D::Error::custom)
    }
}

impl Serialize for Condition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Condition::Equals(value) => value.serialize(serializer),
            Condition::Op { op, operand } => {
                let mut object = Map::with_capacity(1);
                object.insert(op.as_key().to_string(), operand.clone());
                Value::Object(object).serialize(serializer)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Trigger
// ---------------------------------------------------------------------------

/// The gate that decides whether a rule's actions run for a given event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    /// Must equal the event type exactly before conditions are looked at.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Field-level tests against the event payload; all must hold.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub conditions: BTreeMap<String, Condition>,
}

impl Trigger {
    /// An unconditional trigger on `event_type`.
    pub fn on(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            conditions: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// ActionDefinition
// ---------------------------------------------------------------------------

/// A rule's reference to an action type plus its (possibly templated)
/// params. String params may carry `{{dotted.path}}` placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// Unique identifier within this rule (referenced by results).
    pub id: String,
    /// Maps to a registered `Action` implementation.
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// A declarative trigger plus an ordered action chain. Immutable once
/// matched against an event; mutation happens only through the rule store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub trigger: Trigger,
    pub actions: Vec<ActionDefinition>,
}

impl Rule {
    /// Convenience constructor for testing.
    pub fn new(
        name: impl Into<String>,
        trigger: Trigger,
        actions: Vec<ActionDefinition>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            trigger,
            actions,
        }
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A domain occurrence flowing into the engine. Ephemeral; created per
/// occurrence by the event source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(event_type: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            event_type: event_type.into(),
            data,
            timestamp: Utc::now(),
        }
    }
}
