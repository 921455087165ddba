//! Authentication reducers.
//!
//! Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
//! The session reducer never produces effects; the flow reducer describes
//! its backend calls and the session handoff as effects for the store to run.

pub mod flow;
pub mod session;

pub use flow::AuthFlowReducer;
pub use session::SessionReducer;
