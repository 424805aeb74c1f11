//! Action-level error type.

use std::time::Duration;

use thiserror::Error;

/// Errors surrounding a single action attempt.
///
/// The executor uses the variant to decide chain behaviour:
/// - `UnknownType` / `InvalidParams` — the attempt is recorded as a failure
///   and the chain *continues* with the next action.
/// - `Execution` / `Timeout` — the attempt is recorded and the chain *halts*,
///   since later actions are assumed to depend on earlier side effects.
#[derive(Debug, Error, Clone)]
pub enum ActionError {
    /// No implementation is registered for the requested action type.
    #[error("no action registered for type '{0}'")]
    UnknownType(String),

    /// The action definition's params failed validation.
    #[error("invalid action params: {}", .0.join("; "))]
    InvalidParams(Vec<String>),

    /// The action ran and failed.
    #[error("action execution failed: {0}")]
    Execution(String),

    /// The action did not finish within the executor's time budget.
    #[error("action execution timed out after {0:?}")]
    Timeout(Duration),
}
