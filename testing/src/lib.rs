//! # CrowdBolt Testing
//!
//! Testing utilities for reducers.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given-When-Then harness that runs a reducer without a store
//! - [`assertions`]: Helpers for inspecting returned effects
//!
//! ## Example
//!
//! ```ignore
//! use crowdbolt_testing::{assertions, ReducerTest};
//!
//! ReducerTest::new(SessionReducer::new())
//!     .with_env(SessionEnvironment)
//!     .given_state(SessionState::default())
//!     .when_action(SessionAction::SetLoading(true))
//!     .then_state(|state| assert!(state.is_loading))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```


pub use reducer_test::{assertions, ReducerTest};
