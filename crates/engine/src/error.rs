//! Engine-level error types.

use thiserror::Error;

/// A rule record whose JSON-encoded fields could not be decoded.
///
/// Recovered at load time: the offending rule is logged and skipped while
/// the rest of the rule set still loads.
#[derive(Debug, Error)]
pub enum RuleLoadError {
    /// The `trigger` field is not valid trigger JSON (bad syntax, or an
    /// unknown condition operator).
    #[error("rule '{rule_id}': invalid trigger: {source}")]
    Trigger {
        rule_id: String,
        source: serde_json::Error,
    },

    /// The `actions` field is not a valid action-definition list.
    #[error("rule '{rule_id}': invalid actions: {source}")]
    Actions {
        rule_id: String,
        source: serde_json::Error,
    },
}
