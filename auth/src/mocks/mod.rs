//! Mock provider implementations for testing.
//!
//! In-memory stand-ins for the provider traits, for unit and integration
//! tests and for running the demo without a backend.

pub mod session;
pub mod verification;

pub use session::RecordingSession;
pub use verification::{MockVerificationService, VerificationCall};
