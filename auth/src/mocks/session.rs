//! Recording session capability for testing.

use crate::actions::SessionAction;
use crate::environment::SessionEnvironment;
use crate::error::{AuthError, Result};
use crate::providers::SessionAccess;
use crate::reducers::SessionReducer;
use crate::state::SessionState;
use crowdbolt_core::reducer::Reducer;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Default)]
struct Log {
    actions: Vec<SessionAction>,
    state: SessionState,
    unavailable: bool,
}

/// Session capability that records every dispatched action.
///
/// Actions are applied through [`SessionReducer`] so snapshots behave like
/// the real store. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSession {
    log: Arc<Mutex<Log>>,
}

impl RecordingSession {
    /// Create an empty, signed-out recording session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session that refuses every dispatch, like a store that
    /// has shut down.
    #[must_use]
    pub fn unavailable() -> Self {
        let session = Self::new();
        session.lock().unavailable = true;
        session
    }

    /// Actions applied so far, in order.
    #[must_use]
    pub fn actions(&self) -> Vec<SessionAction> {
        self.lock().actions.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Log> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionAccess for RecordingSession {
    fn dispatch(&self, action: SessionAction) -> impl Future<Output = Result<()>> + Send {
        let result = {
            let mut log = self.lock();
            if log.unavailable {
                Err(AuthError::SessionUnavailable(
                    "recording session is unavailable".to_string(),
                ))
            } else {
                let _ = SessionReducer::new().reduce(
                    &mut log.state,
                    action.clone(),
                    &SessionEnvironment,
                );
                log.actions.push(action);
                Ok(())
            }
        };

        async move { result }
    }

    fn snapshot(&self) -> impl Future<Output = SessionState> + Send {
        let state = self.lock().state.clone();
        async move { state }
    }
}
