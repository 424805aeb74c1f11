//! Maps action `type` strings to `Action` implementations.

use std::collections::HashMap;
use std::sync::Arc;

use crate::builtin::notify::{NotificationSink, SendNotificationAction};
use crate::builtin::reminder::ScheduleReminderAction;
use crate::builtin::task::{AssignTaskAction, CreateTaskAction, UpdateTaskStatusAction};
use crate::Action;

/// Registry of executable actions, keyed by action type.
///
/// The engine is agnostic to how an action is implemented; anything that
/// fulfils [`Action`] can be registered under a type string.
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-loaded with the built-in action set, delivering
    /// notifications through `sink`.
    pub fn builtin(sink: Arc<dyn NotificationSink>) -> Self {
        let notification = Arc::new(SendNotificationAction::new(sink));

        let mut registry = Self::new();
        registry.register("create-task", Arc::new(CreateTaskAction));
        registry.register("update-task-status", Arc::new(UpdateTaskStatusAction));
        registry.register("assign-task", Arc::new(AssignTaskAction));
        registry.register("send-notification", notification.clone());
        registry.register(
            "schedule-reminder",
            Arc::new(ScheduleReminderAction::new(notification)),
        );
        registry
    }

    pub fn register(&mut self, action_type: impl Into<String>, action: Arc<dyn Action>) {
        self.actions.insert(action_type.into(), action);
    }

    pub fn get(&self, action_type: &str) -> Option<Arc<dyn Action>> {
        self.actions.get(action_type).cloned()
    }

    /// Registered action types, unordered.
    pub fn action_types(&self) -> Vec<&str> {
        self.actions.keys().map(String::as_str).collect()
    }
}
