//! `engine` crate — domain models, trigger matching, template resolution,
//! and the rule-processing pipeline.
//!
//! The flow for one incoming event:
//!
//! ```text
//! Event → RuleEngine → (trigger match per rule)
//!       → ActionExecutor (per matched rule, chain in declared order)
//!       → WorkflowMonitor (start/complete per matched rule)
//! ```

pub mod models;
pub mod error;
pub mod trigger;
pub mod template;
pub mod executor;
pub mod engine;
pub mod store;
pub mod loader;
pub mod events;

pub use models::{ActionDefinition, Condition, ConditionOp, Event, Rule, Trigger};
pub use error::RuleLoadError;
pub use executor::{ActionExecutor, ExecutorConfig};
pub use engine::RuleEngine;
pub use store::{InMemoryRuleStore, NewRule, RuleRecord, RuleStore};
pub use events::{event_bus, EventChannel, EventPublisher};
