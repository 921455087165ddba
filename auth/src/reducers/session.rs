//! Session state reducer.
//!
//! Every transition is total: no input is refused and none produces an
//! effect. Callers perform I/O elsewhere and then report its outcome here.

use crate::actions::SessionAction;
use crate::environment::SessionEnvironment;
use crate::state::SessionState;
use crowdbolt_core::effect::Effect;
use crowdbolt_core::reducer::Reducer;
use crowdbolt_core::{smallvec, SmallVec};

/// Reducer owning [`SessionState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionReducer;

impl SessionReducer {
    /// Create a new session reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for SessionReducer {
    type State = SessionState;
    type Action = SessionAction;
    type Environment = SessionEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            SessionAction::SetLoading(flag) => {
                state.is_loading = flag;
            },

            SessionAction::SetError(message) => {
                tracing::debug!(%message, "Session error recorded");
                state.error = Some(message);
            },

            SessionAction::SetUser(user) => {
                tracing::info!(user_id = %user.id, role = %user.role, "User signed in");
                state.user = Some(user);
                state.is_authenticated = true;
                state.error = None;
            },

            SessionAction::SetTokens(tokens) => {
                tracing::debug!("Session tokens replaced");
                state.token = Some(tokens.token);
                state.refresh_token = Some(tokens.refresh_token);
            },

            SessionAction::UpdateUser(patch) => match state.user.as_mut() {
                Some(user) => user.apply(patch),
                None => tracing::debug!("UpdateUser ignored: no user signed in"),
            },

            SessionAction::ClearAuth => {
                tracing::info!("Session cleared");
                state.user = None;
                state.token = None;
                state.refresh_token = None;
                state.is_authenticated = false;
                state.error = None;
            },
        }

        smallvec![Effect::None]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Role, TokenPair, User, UserPatch};
    use crowdbolt_testing::{assertions, ReducerTest};

    fn mock_user() -> User {
        User {
            id: "1".to_string(),
            email: "test@crowdbolt.com".to_string(),
            username: "testuser".to_string(),
            role: Role::Buyer,
            is_verified: true,
            identity_verified: false,
        }
    }

    fn mock_tokens() -> TokenPair {
        TokenPair {
            token: "mock-access-token".to_string(),
            refresh_token: "mock-refresh-token".to_string(),
        }
    }

    fn test() -> ReducerTest<SessionReducer, SessionState, SessionAction, SessionEnvironment> {
        ReducerTest::new(SessionReducer::new()).with_env(SessionEnvironment)
    }

    #[test]
    fn test_set_loading() {
        test()
            .given_state(SessionState::default())
            .when_action(SessionAction::SetLoading(true))
            .then_state(|state| {
                assert!(state.is_loading);
                assert_eq!(state.error, None);
            })
            .then_effects(assertions::assert_no_effects)
            .run();

        test()
            .given_state(SessionState {
                is_loading: true,
                ..SessionState::default()
            })
            .when_action(SessionAction::SetLoading(false))
            .then_state(|state| assert!(!state.is_loading))
            .run();
    }

    #[test]
    fn test_set_error_keeps_loading() {
        test()
            .given_state(SessionState {
                is_loading: true,
                ..SessionState::default()
            })
            .when_action(SessionAction::SetError("Invalid credentials".to_string()))
            .then_state(|state| {
                assert_eq!(state.error.as_deref(), Some("Invalid credentials"));
                assert!(state.is_loading);
                assert!(!state.is_authenticated);
            })
            .run();
    }

    #[test]
    fn test_set_user_authenticates_and_clears_error() {
        test()
            .given_state(SessionState {
                error: Some("Previous error".to_string()),
                ..SessionState::default()
            })
            .when_action(SessionAction::SetUser(mock_user()))
            .then_state(|state| {
                assert_eq!(state.user, Some(mock_user()));
                assert!(state.is_authenticated);
                assert_eq!(state.error, None);
                assert_eq!(state.token, None);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_set_tokens_does_not_authenticate() {
        test()
            .given_state(SessionState::default())
            .when_action(SessionAction::SetTokens(mock_tokens()))
            .then_state(|state| {
                assert_eq!(state.token.as_deref(), Some("mock-access-token"));
                assert_eq!(state.refresh_token.as_deref(), Some("mock-refresh-token"));
                assert!(!state.is_authenticated);
                assert_eq!(state.user, None);
            })
            .run();
    }

    #[test]
    fn test_update_user_merges_given_fields() {
        test()
            .given_state(SessionState::default())
            .when_actions([
                SessionAction::SetUser(mock_user()),
                SessionAction::UpdateUser(
                    UserPatch::default().is_verified(false).identity_verified(true),
                ),
            ])
            .then_state(|state| {
                let user = state.user.clone().unwrap_or_else(mock_user);
                assert_eq!(user.email, "test@crowdbolt.com");
                assert_eq!(user.username, "testuser");
                assert!(!user.is_verified);
                assert!(user.identity_verified);
            })
            .run();
    }

    #[test]
    fn test_update_user_without_user_is_noop() {
        test()
            .given_state(SessionState::default())
            .when_action(SessionAction::UpdateUser(UserPatch::default().is_verified(false)))
            .then_state(|state| assert_eq!(*state, SessionState::default()))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_clear_auth_resets_session_but_not_loading() {
        test()
            .given_state(SessionState::default())
            .when_actions([
                SessionAction::SetUser(mock_user()),
                SessionAction::SetTokens(mock_tokens()),
                SessionAction::SetLoading(true),
                SessionAction::SetError("stale".to_string()),
                SessionAction::ClearAuth,
            ])
            .then_state(|state| {
                assert_eq!(state.user, None);
                assert_eq!(state.token, None);
                assert_eq!(state.refresh_token, None);
                assert!(!state.is_authenticated);
                assert_eq!(state.error, None);
                assert!(state.is_loading);
            })
            .run();
    }

    #[test]
    fn test_clear_auth_twice_equals_once() {
        let reducer = SessionReducer::new();
        let mut once = SessionState::default();
        reducer.reduce(&mut once, SessionAction::SetUser(mock_user()), &SessionEnvironment);
        let mut twice = once.clone();

        reducer.reduce(&mut once, SessionAction::ClearAuth, &SessionEnvironment);
        reducer.reduce(&mut twice, SessionAction::ClearAuth, &SessionEnvironment);
        reducer.reduce(&mut twice, SessionAction::ClearAuth, &SessionEnvironment);

        assert_eq!(once, twice);
        assert_eq!(once, SessionState::default());
    }
}
