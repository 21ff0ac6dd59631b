//! Order state machine
//!
//! Every order mutation goes through a command action implementing
//! [`CommandHandler`]. Transition legality lives in the pure
//! [`transition`] module; actions only resolve scope, run the plan and
//! stage side effects on the [`CommandContext`].

pub mod actions;
pub mod context;
pub mod transition;

pub use context::{CommandContext, CommandHandler, CommandMetadata, CommandOutcome, OrderError};
pub use transition::{AssignPhase, TransitionEffects, assign_phase, plan_transition};
