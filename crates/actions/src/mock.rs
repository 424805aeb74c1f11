//! Test doubles for `Action` and `NotificationSink`.
//!
//! Useful in unit and integration tests where a real action implementation
//! is either unavailable or irrelevant.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::builtin::notify::{Notification, NotificationSink};
use crate::{Action, ActionContext, ActionError};

/// Behaviour injected into `MockAction` at construction time.
pub enum MockBehaviour {
    /// Succeed with a specific JSON payload.
    Succeed(Value),
    /// Fail execution with the given message (halts the chain).
    FailExecution(String),
    /// Report the given validation problems from `validate_params`.
    RejectParams(Vec<String>),
    /// Never complete; used to exercise the executor timeout.
    Hang,
}

/// A mock action that records every call it receives and behaves as
/// programmed.
pub struct MockAction {
    /// Label used in test assertions.
    pub name: String,
    /// What the action will do when invoked.
    pub behaviour: MockBehaviour,
    /// All resolved params seen by `execute` (in call order).
    pub calls: Arc<Mutex<Vec<Map<String, Value>>>>,
}

impl MockAction {
    pub fn succeeding(name: impl Into<String>, value: Value) -> Self {
        Self::with_behaviour(name, MockBehaviour::Succeed(value))
    }

    pub fn failing(name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::with_behaviour(name, MockBehaviour::FailExecution(msg.into()))
    }

    pub fn rejecting_params(name: impl Into<String>, problems: Vec<String>) -> Self {
        Self::with_behaviour(name, MockBehaviour::RejectParams(problems))
    }

    pub fn hanging(name: impl Into<String>) -> Self {
        Self::with_behaviour(name, MockBehaviour::Hang)
    }

    fn with_behaviour(name: impl Into<String>, behaviour: MockBehaviour) -> Self {
        Self {
            name: name.into(),
            behaviour,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of times this action has been executed.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// The resolved params the n-th call received.
    pub fn call(&self, n: usize) -> Option<Map<String, Value>> {
        self.calls.lock().unwrap().get(n).cloned()
    }
}

#[async_trait]
impl Action for MockAction {
    fn validate_params(&self, _params: &Map<String, Value>) -> Vec<String> {
        match &self.behaviour {
            MockBehaviour::RejectParams(problems) => problems.clone(),
            _ => Vec::new(),
        }
    }

    async fn execute(
        &self,
        _ctx: &ActionContext,
        params: &Map<String, Value>,
    ) -> Result<Value, ActionError> {
        self.calls.lock().unwrap().push(params.clone());

        match &self.behaviour {
            MockBehaviour::Succeed(v) => Ok(v.clone()),
            MockBehaviour::FailExecution(msg) => Err(ActionError::Execution(msg.clone())),
            MockBehaviour::RejectParams(problems) => {
                Err(ActionError::InvalidParams(problems.clone()))
            }
            MockBehaviour::Hang => {
                // Far beyond any realistic executor timeout.
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Value::Null)
            }
        }
    }
}

/// A `NotificationSink` that records deliveries instead of sending them.
#[derive(Default)]
pub struct RecordingSink {
    deliveries: Mutex<Vec<(String, String)>>,
    reject_with: Option<String>,
}

impl RecordingSink {
    /// A sink that fails every delivery with the given message.
    pub fn rejecting(msg: impl Into<String>) -> Self {
        Self {
            deliveries: Mutex::new(Vec::new()),
            reject_with: Some(msg.into()),
        }
    }

    /// `(user_id, message)` pairs delivered so far.
    pub fn delivered(&self) -> Vec<(String, String)> {
        self.deliveries.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, notification: &Notification) -> anyhow::Result<()> {
        if let Some(msg) = &self.reject_with {
            anyhow::bail!("{msg}");
        }
        self.deliveries
            .lock()
            .unwrap()
            .push((notification.user_id.clone(), notification.message.clone()));
        Ok(())
    }
}
