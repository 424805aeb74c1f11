//! `actions` crate — the `Action` trait, the action registry, and the
//! built-in action implementations.
//!
//! Every action — built-in and externally registered alike — must implement
//! [`Action`]. The engine crate dispatches execution through this trait
//! object after looking the action type up in the [`ActionRegistry`].

pub mod error;
pub mod traits;
pub mod registry;
pub mod result;
pub mod builtin;
pub mod mock;

pub use error::ActionError;
pub use traits::{Action, ActionContext};
pub use registry::ActionRegistry;
pub use result::ActionResult;
pub use builtin::notify::NotificationSink;
