//! Run lifecycle: one invocation moves from `ready` to exactly one terminal state.

pub mod state_machine;

pub use state_machine::{RunEvent, RunLifecycle, RunOutcome};
