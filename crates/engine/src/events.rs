//! Named event channels and the in-process event bus.
//!
//! Domain services publish through [`EventPublisher`]; the engine drains the
//! receiving end (`RuleEngine::run`). The channel enum names the event types
//! this domain emits, but matching itself treats types as opaque strings —
//! rules may trigger on types outside this list.

use std::str::FromStr;

use serde_json::{Map, Value};
use tokio::sync::mpsc;

use crate::models::Event;

/// The event types emitted by the surrounding task-management domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventChannel {
    TaskCreated,
    TaskUpdated,
    TaskCompleted,
    TaskOverdue,
    ProjectMilestone,
    ProjectDeadline,
    UserWorkload,
    UserInactive,
}

impl EventChannel {
    pub const ALL: [EventChannel; 8] = [
        Self::TaskCreated,
        Self::TaskUpdated,
        Self::TaskCompleted,
        Self::TaskOverdue,
        Self::ProjectMilestone,
        Self::ProjectDeadline,
        Self::UserWorkload,
        Self::UserInactive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskCreated => "task:created",
            Self::TaskUpdated => "task:updated",
            Self::TaskCompleted => "task:completed",
            Self::TaskOverdue => "task:overdue",
            Self::ProjectMilestone => "project:milestone",
            Self::ProjectDeadline => "project:deadline",
            Self::UserWorkload => "user:workload",
            Self::UserInactive => "user:inactive",
        }
    }
}

impl std::fmt::Display for EventChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|channel| channel.as_str() == s)
            .ok_or_else(|| format!("unknown event channel: {s}"))
    }
}

/// Create a bounded event bus; hand the receiver to `RuleEngine::run`.
pub fn event_bus(capacity: usize) -> (EventPublisher, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventPublisher { tx }, rx)
}

/// Sending side of the event bus. Cheap to clone; one per domain service.
#[derive(Clone)]
pub struct EventPublisher {
    tx: mpsc::Sender<Event>,
}

impl EventPublisher {
    /// Publish onto a named channel.
    pub async fn publish(
        &self,
        channel: EventChannel,
        data: Map<String, Value>,
    ) -> Result<(), mpsc::error::SendError<Event>> {
        self.publish_event(Event::new(channel.as_str(), data)).await
    }

    /// Publish a pre-built event (any type string).
    pub async fn publish_event(
        &self,
        event: Event,
    ) -> Result<(), mpsc::error::SendError<Event>> {
        self.tx.send(event).await
    }
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_names_round_trip() {
        for channel in EventChannel::ALL {
            assert_eq!(channel.as_str().parse::<EventChannel>().unwrap(), channel);
        }
        assert!("task:exploded".parse::<EventChannel>().is_err());
    }

    #[tokio::test]
    async fn published_events_arrive_in_order() {
        let (publisher, mut rx) = event_bus(8);

        publisher
            .publish(EventChannel::TaskCreated, Map::new())
            .await
            .unwrap();
        publisher
            .publish(EventChannel::UserInactive, Map::new())
            .await
            .unwrap();
        drop(publisher);

        assert_eq!(rx.recv().await.unwrap().event_type, "task:created");
        assert_eq!(rx.recv().await.unwrap().event_type, "user:inactive");
        assert!(rx.recv().await.is_none());
    }
}
