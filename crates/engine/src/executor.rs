//! Action chain execution.
//!
//! `ActionExecutor` runs one rule's action chain:
//! 1. Looks each definition's `type` up in the `ActionRegistry`.
//! 2. Validates the raw params via the action's `validate_params`.
//! 3. Resolves `{{...}}` templates against the context, then executes.
//!
//! Failure handling is asymmetric: an unknown action type or invalid params
//! records a failure and *continues* with the next action, while an
//! execution failure (including a timeout) records a failure and *halts*
//! the chain — later actions are assumed to depend on earlier side effects.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use actions::{ActionContext, ActionError, ActionRegistry, ActionResult};

use crate::models::ActionDefinition;
use crate::template;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for the executor.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Upper bound on a single action's `execute` call. A timeout counts as
    /// an execution failure and halts the chain.
    pub action_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            action_timeout: Duration::from_secs(30),
        }
    }
}

// ---------------------------------------------------------------------------
// ActionExecutor
// ---------------------------------------------------------------------------

/// Stateless runner for a single rule's action chain.
pub struct ActionExecutor {
    registry: Arc<ActionRegistry>,
    config: ExecutorConfig,
}

impl ActionExecutor {
    pub fn new(registry: Arc<ActionRegistry>) -> Self {
        Self::with_config(registry, ExecutorConfig::default())
    }

    pub fn with_config(registry: Arc<ActionRegistry>, config: ExecutorConfig) -> Self {
        Self { registry, config }
    }

    /// Run `definitions` in declared order against `ctx`, returning one
    /// result per attempted action.
    pub async fn execute_chain(
        &self,
        definitions: &[ActionDefinition],
        ctx: &ActionContext,
    ) -> Vec<ActionResult> {
        let mut results = Vec::with_capacity(definitions.len());
        let template_root = ctx.template_root();

        for definition in definitions {
            let Some(action) = self.registry.get(&definition.action_type) else {
                warn!(
                    action_id = %definition.id,
                    action_type = %definition.action_type,
                    "unknown action type, skipping"
                );
                results.push(ActionResult::failure(
                    definition.id.as_str(),
                    ActionError::UnknownType(definition.action_type.clone()).to_string(),
                ));
                continue;
            };

            let problems = action.validate_params(&definition.params);
            if !problems.is_empty() {
                warn!(
                    action_id = %definition.id,
                    action_type = %definition.action_type,
                    problems = ?problems,
                    "invalid action params, skipping"
                );
                results.push(ActionResult::failure(
                    definition.id.as_str(),
                    ActionError::InvalidParams(problems).to_string(),
                ));
                continue;
            }

            let params = template::resolve_params(&definition.params, &template_root);
            let attempt =
                tokio::time::timeout(self.config.action_timeout, action.execute(ctx, &params))
                    .await;

            match attempt {
                Ok(Ok(data)) => {
                    debug!(action_id = %definition.id, "action succeeded");
                    results.push(ActionResult::success(definition.id.as_str(), data));
                }
                Ok(Err(e)) => {
                    error!(action_id = %definition.id, error = %e, "action failed, halting chain");
                    results.push(ActionResult::failure(definition.id.as_str(), e.to_string()));
                    break;
                }
                Err(_) => {
                    error!(
                        action_id = %definition.id,
                        timeout = ?self.config.action_timeout,
                        "action timed out, halting chain"
                    );
                    results.push(ActionResult::failure(
                        definition.id.as_str(),
                        ActionError::Timeout(self.config.action_timeout).to_string(),
                    ));
                    break;
                }
            }
        }

        results
    }
}
