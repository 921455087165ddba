//! Authentication environments.
//!
//! Dependencies injected into the auth reducers.

use crate::providers::{SessionAccess, VerificationService};

/// Environment of the session reducer.
///
/// The session store is a pure state container and needs nothing injected.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionEnvironment;

/// Environment of the sign-in flow reducer.
///
/// # Type Parameters
///
/// - `V`: Verification backend
/// - `S`: Session store capability that receives the verified identity
#[derive(Debug, Clone)]
pub struct AuthFlowEnvironment<V, S>
where
    V: VerificationService + Clone,
    S: SessionAccess + Clone,
{
    /// Sends and checks verification codes.
    pub verifier: V,

    /// Session store to sign the user into.
    pub session: S,
}

impl<V, S> AuthFlowEnvironment<V, S>
where
    V: VerificationService + Clone,
    S: SessionAccess + Clone,
{
    /// Create a new flow environment.
    #[must_use]
    pub const fn new(verifier: V, session: S) -> Self {
        Self { verifier, session }
    }
}
