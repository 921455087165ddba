//! Authentication providers.
//!
//! Traits for everything the auth reducers reach outside themselves, plus
//! the production implementations.
//!
//! # Architecture
//!
//! Providers are **interfaces**. Reducers depend on the traits; the
//! application injects concrete types through the environment:
//!
//! - **Testing**: [`crate::mocks`] (in-memory, scripted)
//! - **Production**: [`HttpVerificationService`] and [`SessionHandle`]

pub mod http;
pub mod session;
pub mod verification;

pub use http::HttpVerificationService;
pub use session::{SessionAccess, SessionHandle};
pub use verification::VerificationService;
