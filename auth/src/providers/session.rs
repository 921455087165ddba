//! Session store capability.
//!
//! Components that read or change the session depend on [`SessionAccess`]
//! rather than on a concrete store, and can only change it through
//! [`SessionAction`]s.

use crate::actions::SessionAction;
use crate::environment::SessionEnvironment;
use crate::error::Result;
use crate::reducers::SessionReducer;
use crate::state::SessionState;
use crate::SessionStore;
use std::future::Future;

/// Read and transition the application's session state.
pub trait SessionAccess: Send + Sync {
    /// Apply one session transition.
    ///
    /// The transition has been applied when the future resolves.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AuthError::SessionUnavailable`] if the store no
    /// longer accepts actions.
    fn dispatch(&self, action: SessionAction) -> impl Future<Output = Result<()>> + Send;

    /// Copy of the current session state.
    fn snapshot(&self) -> impl Future<Output = SessionState> + Send;
}

/// Cloneable handle to a running session store.
///
/// Construct one per application and pass clones to every component that
/// needs the session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    store: SessionStore,
}

impl SessionHandle {
    /// Start a session store in the signed-out initial state.
    #[must_use]
    pub fn new() -> Self {
        Self::from_store(SessionStore::new(
            SessionState::default(),
            SessionReducer::new(),
            SessionEnvironment,
        ))
    }

    /// Wrap an existing session store.
    #[must_use]
    pub const fn from_store(store: SessionStore) -> Self {
        Self { store }
    }

    /// Whether a user is signed in.
    pub async fn is_authenticated(&self) -> bool {
        self.store.state(|s| s.is_authenticated).await
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &SessionStore {
        &self.store
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionAccess for SessionHandle {
    async fn dispatch(&self, action: SessionAction) -> Result<()> {
        self.store.send(action).await?;
        Ok(())
    }

    async fn snapshot(&self) -> SessionState {
        self.store.state(SessionState::clone).await
    }
}
