//! Two-step phone sign-in reducer.
//!
//! # Flow
//!
//! ```text
//! Closed --Open--> Phone --SubmitPhone--> (pending) --CodeSent--> Verification
//! Verification --SubmitVerification--> (pending) --CodeVerified--> Closed + session handoff
//! Verification --GoBack--> Phone
//! any --Close--> Closed
//! ```
//!
//! A failed round-trip leaves the form on its step with the error shown.
//! Every submission is tagged with a [`RequestId`]; feedback for any other
//! id (for example one issued before the modal was closed) is discarded.

use crate::actions::{AuthFlowAction, SessionAction};
use crate::constants::VERIFICATION_CODE_LENGTH;
use crate::environment::AuthFlowEnvironment;
use crate::providers::{SessionAccess, VerificationService};
use crate::state::{AuthFlowState, FlowForm, FlowStep, Modal, RequestId, VerifiedIdentity};
use crowdbolt_core::effect::Effect;
use crowdbolt_core::reducer::Reducer;
use crowdbolt_core::{smallvec, SmallVec};
use std::marker::PhantomData;

/// Reducer owning [`AuthFlowState`].
///
/// Generic over the verification backend `V` and the session capability
/// `S` it hands the verified identity to.
#[derive(Debug, Clone)]
pub struct AuthFlowReducer<V, S> {
    /// Phantom data to hold type parameters.
    _phantom: PhantomData<(V, S)>,
}

impl<V, S> AuthFlowReducer<V, S> {
    /// Create a new flow reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<V, S> Default for AuthFlowReducer<V, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S> AuthFlowReducer<V, S>
where
    V: VerificationService + Clone + 'static,
    S: SessionAccess + Clone + 'static,
{
    /// The form awaiting `request` on `step`, or `None` if the response is stale.
    fn awaiting(
        state: &mut AuthFlowState,
        request: RequestId,
        step: FlowStep,
    ) -> Option<&mut FlowForm> {
        match state.form_mut() {
            Some(form) if form.pending == Some(request) && form.step == step => Some(form),
            Some(form) => {
                tracing::warn!(
                    %request,
                    pending = ?form.pending,
                    step = form.step.as_str(),
                    "Discarding stale response"
                );
                None
            },
            None => {
                tracing::warn!(%request, "Discarding response for closed modal");
                None
            },
        }
    }

    /// One session transition as an effect.
    fn dispatch(session: S, action: SessionAction) -> Effect<AuthFlowAction> {
        Effect::future(async move {
            if let Err(error) = session.dispatch(action).await {
                tracing::error!(%error, "Session handoff failed");
            }
            None
        })
    }

    /// Sign the verified user in: `SetUser`, then `SetTokens`.
    fn hand_off(session: &S, identity: VerifiedIdentity) -> Effect<AuthFlowAction> {
        let VerifiedIdentity { user, tokens } = identity;
        Effect::chain(vec![
            Self::dispatch(session.clone(), SessionAction::SetUser(user)),
            Self::dispatch(session.clone(), SessionAction::SetTokens(tokens)),
        ])
    }
}

impl<V, S> Reducer for AuthFlowReducer<V, S>
where
    V: VerificationService + Clone + 'static,
    S: SessionAccess + Clone + 'static,
{
    type State = AuthFlowState;
    type Action = AuthFlowAction;
    type Environment = AuthFlowEnvironment<V, S>;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // Open / Close
            // ═══════════════════════════════════════════════════════════════
            AuthFlowAction::Open => {
                if state.is_open() {
                    tracing::debug!("Open ignored: modal already open");
                } else {
                    tracing::debug!("Sign-in modal opened");
                    state.modal = Modal::Open(FlowForm::default());
                }
            },

            AuthFlowAction::Close => {
                if let Some(form) = state.form() {
                    tracing::debug!(pending = ?form.pending, "Sign-in modal closed");
                }
                state.modal = Modal::Closed;
            },

            // ═══════════════════════════════════════════════════════════════
            // Input
            // ═══════════════════════════════════════════════════════════════
            AuthFlowAction::PhoneNumberChanged(value) => match state.form_mut() {
                Some(form) if form.step == FlowStep::Phone && !form.loading => {
                    form.phone_number = value;
                    form.error = None;
                },
                _ => tracing::debug!("Phone number edit ignored"),
            },

            AuthFlowAction::VerificationCodeChanged(value) => match state.form_mut() {
                Some(form) if form.step == FlowStep::Verification && !form.loading => {
                    form.verification_code = value.chars().take(VERIFICATION_CODE_LENGTH).collect();
                    form.error = None;
                },
                _ => tracing::debug!("Verification code edit ignored"),
            },

            AuthFlowAction::GoBack => match state.form_mut() {
                Some(form) if form.step == FlowStep::Verification => {
                    tracing::debug!("Back to phone number entry");
                    form.step = FlowStep::Phone;
                    form.verification_code.clear();
                    form.loading = false;
                    form.error = None;
                    form.pending = None;
                },
                _ => tracing::debug!("GoBack ignored outside verification step"),
            },

            // ═══════════════════════════════════════════════════════════════
            // Submissions
            // ═══════════════════════════════════════════════════════════════
            AuthFlowAction::SubmitPhone => {
                let phone_number = match state.form().map(|form| {
                    form.check_phone_submission()
                        .map(|()| form.phone_number.trim().to_string())
                }) {
                    Some(Ok(phone_number)) => phone_number,
                    Some(Err(error)) => {
                        tracing::debug!(%error, "Phone submission refused");
                        return smallvec![Effect::None];
                    },
                    None => {
                        tracing::debug!("SubmitPhone ignored: modal closed");
                        return smallvec![Effect::None];
                    },
                };

                let Some(request) = state.start_request() else {
                    return smallvec![Effect::None];
                };
                tracing::debug!(%request, "Requesting verification code");

                let verifier = env.verifier.clone();
                return smallvec![Effect::future(async move {
                    match verifier.send_verification_code(&phone_number).await {
                        Ok(()) => Some(AuthFlowAction::CodeSent { request }),
                        Err(error) => Some(AuthFlowAction::CodeSendFailed { request, error }),
                    }
                })];
            },

            AuthFlowAction::SubmitVerification => {
                let submission = match state.form().map(|form| {
                    form.check_code_submission().map(|()| {
                        (
                            form.phone_number.trim().to_string(),
                            form.verification_code.clone(),
                        )
                    })
                }) {
                    Some(Ok(submission)) => submission,
                    Some(Err(error)) => {
                        tracing::debug!(%error, "Code submission refused");
                        return smallvec![Effect::None];
                    },
                    None => {
                        tracing::debug!("SubmitVerification ignored: modal closed");
                        return smallvec![Effect::None];
                    },
                };

                let Some(request) = state.start_request() else {
                    return smallvec![Effect::None];
                };
                tracing::debug!(%request, "Verifying code");

                let verifier = env.verifier.clone();
                let (phone_number, code) = submission;
                return smallvec![Effect::future(async move {
                    match verifier.verify_code(&phone_number, &code).await {
                        Ok(identity) => Some(AuthFlowAction::CodeVerified { request, identity }),
                        Err(error) => Some(AuthFlowAction::VerificationFailed { request, error }),
                    }
                })];
            },

            // ═══════════════════════════════════════════════════════════════
            // Effect Feedback
            // ═══════════════════════════════════════════════════════════════
            AuthFlowAction::CodeSent { request } => {
                if let Some(form) = Self::awaiting(state, request, FlowStep::Phone) {
                    tracing::debug!(%request, "Verification code sent");
                    form.step = FlowStep::Verification;
                    form.verification_code.clear();
                    form.loading = false;
                    form.pending = None;
                }
            },

            AuthFlowAction::CodeSendFailed { request, error } => {
                if let Some(form) = Self::awaiting(state, request, FlowStep::Phone) {
                    tracing::warn!(%request, %error, "Sending verification code failed");
                    form.loading = false;
                    form.pending = None;
                    form.error = Some(error.to_string());
                }
            },

            AuthFlowAction::CodeVerified { request, identity } => {
                if Self::awaiting(state, request, FlowStep::Verification).is_none() {
                    return smallvec![Effect::None];
                }

                tracing::info!(%request, user_id = %identity.user.id, "Phone verified");
                state.modal = Modal::Closed;
                return smallvec![Self::hand_off(&env.session, identity)];
            },

            AuthFlowAction::VerificationFailed { request, error } => {
                if let Some(form) = Self::awaiting(state, request, FlowStep::Verification) {
                    tracing::warn!(%request, %error, "Verification failed");
                    form.loading = false;
                    form.pending = None;
                    form.error = Some(error.to_string());
                }
            },
        }

        smallvec![Effect::None]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use crate::mocks::{MockVerificationService, RecordingSession};
    use crowdbolt_testing::{assertions, ReducerTest};

    type TestReducer = AuthFlowReducer<MockVerificationService, RecordingSession>;
    type TestEnv = AuthFlowEnvironment<MockVerificationService, RecordingSession>;

    fn env() -> TestEnv {
        AuthFlowEnvironment::new(MockVerificationService::new(), RecordingSession::new())
    }

    fn test() -> ReducerTest<TestReducer, AuthFlowState, AuthFlowAction, TestEnv> {
        ReducerTest::new(TestReducer::new()).with_env(env())
    }

    fn open_with_phone(phone: &str) -> AuthFlowState {
        let mut state = AuthFlowState::default();
        state.modal = Modal::Open(FlowForm {
            phone_number: phone.to_string(),
            ..FlowForm::default()
        });
        state
    }

    fn awaiting_code(phone: &str, code: &str) -> AuthFlowState {
        let mut state = AuthFlowState::default();
        state.modal = Modal::Open(FlowForm {
            step: FlowStep::Verification,
            phone_number: phone.to_string(),
            verification_code: code.to_string(),
            ..FlowForm::default()
        });
        state
    }

    fn form(state: &AuthFlowState) -> FlowForm {
        state.form().cloned().unwrap()
    }

    #[test]
    fn test_open_starts_fresh_form() {
        test()
            .given_state(AuthFlowState::default())
            .when_action(AuthFlowAction::Open)
            .then_state(|state| {
                assert!(state.is_open());
                assert_eq!(form(state), FlowForm::default());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_open_while_open_keeps_form() {
        test()
            .given_state(open_with_phone("+15551234567"))
            .when_action(AuthFlowAction::Open)
            .then_state(|state| assert_eq!(form(state).phone_number, "+15551234567"))
            .run();
    }

    #[test]
    fn test_close_then_open_resets_everything() {
        test()
            .given_state(awaiting_code("+15551234567", "123"))
            .when_actions([AuthFlowAction::Close, AuthFlowAction::Open])
            .then_state(|state| assert_eq!(form(state), FlowForm::default()))
            .run();
    }

    #[test]
    fn test_empty_phone_is_refused() {
        test()
            .given_state(open_with_phone(""))
            .when_action(AuthFlowAction::SubmitPhone)
            .then_state(|state| {
                let form = form(state);
                assert_eq!(form.step, FlowStep::Phone);
                assert!(!form.loading);
                assert_eq!(form.pending, None);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_submit_phone_starts_request() {
        test()
            .given_state(open_with_phone("+15551234567"))
            .when_action(AuthFlowAction::SubmitPhone)
            .then_state(|state| {
                let form = form(state);
                assert_eq!(form.step, FlowStep::Phone);
                assert!(form.loading);
                assert_eq!(form.pending, Some(RequestId(1)));
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_resubmission_while_loading_is_refused() {
        test()
            .given_state(open_with_phone("+15551234567"))
            .when_actions([AuthFlowAction::SubmitPhone, AuthFlowAction::SubmitPhone])
            .then_state(|state| assert_eq!(form(state).pending, Some(RequestId(1))))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 2);
                assert!(effects[1].is_none());
            })
            .run();
    }

    #[test]
    fn test_code_sent_moves_to_verification() {
        test()
            .given_state(open_with_phone("+15551234567"))
            .when_actions([
                AuthFlowAction::SubmitPhone,
                AuthFlowAction::CodeSent {
                    request: RequestId(1),
                },
            ])
            .then_state(|state| {
                let form = form(state);
                assert_eq!(form.step, FlowStep::Verification);
                assert!(!form.loading);
                assert_eq!(form.pending, None);
                assert_eq!(form.phone_number, "+15551234567");
            })
            .run();
    }

    #[test]
    fn test_code_send_failure_stays_on_phone() {
        test()
            .given_state(open_with_phone("+15551234567"))
            .when_actions([
                AuthFlowAction::SubmitPhone,
                AuthFlowAction::CodeSendFailed {
                    request: RequestId(1),
                    error: AuthError::ExternalService {
                        reason: "Invalid phone number".to_string(),
                    },
                },
            ])
            .then_state(|state| {
                let form = form(state);
                assert_eq!(form.step, FlowStep::Phone);
                assert!(!form.loading);
                assert_eq!(form.error.as_deref(), Some("Invalid phone number"));
                assert!(form.can_submit());
            })
            .run();
    }

    #[test]
    fn test_code_input_is_capped() {
        test()
            .given_state(awaiting_code("+15551234567", ""))
            .when_action(AuthFlowAction::VerificationCodeChanged("12345678".to_string()))
            .then_state(|state| assert_eq!(form(state).verification_code, "123456"))
            .run();
    }

    #[test]
    fn test_five_digit_code_is_refused() {
        test()
            .given_state(awaiting_code("+15551234567", "12345"))
            .when_action(AuthFlowAction::SubmitVerification)
            .then_state(|state| {
                let form = form(state);
                assert!(!form.loading);
                assert_eq!(form.pending, None);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_six_digit_code_starts_verification() {
        test()
            .given_state(awaiting_code("+15551234567", "123456"))
            .when_action(AuthFlowAction::SubmitVerification)
            .then_state(|state| {
                let form = form(state);
                assert!(form.loading);
                assert_eq!(form.pending, Some(RequestId(1)));
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_code_verified_closes_and_hands_off() {
        test()
            .given_state(awaiting_code("+15551234567", "123456"))
            .when_actions([
                AuthFlowAction::SubmitVerification,
                AuthFlowAction::CodeVerified {
                    request: RequestId(1),
                    identity: MockVerificationService::default_identity(),
                },
            ])
            .then_state(|state| assert!(!state.is_open()))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 2);
                assertions::assert_has_sequential_effect(effects);
                let Effect::Sequential(steps) = &effects[1] else {
                    panic!("expected handoff chain, got {:?}", effects[1]);
                };
                assert_eq!(steps.len(), 2);
            })
            .run();
    }

    #[test]
    fn test_verification_failure_keeps_step() {
        test()
            .given_state(awaiting_code("+15551234567", "000000"))
            .when_actions([
                AuthFlowAction::SubmitVerification,
                AuthFlowAction::VerificationFailed {
                    request: RequestId(1),
                    error: AuthError::ExternalService {
                        reason: "Invalid code".to_string(),
                    },
                },
            ])
            .then_state(|state| {
                let form = form(state);
                assert_eq!(form.step, FlowStep::Verification);
                assert!(!form.loading);
                assert_eq!(form.error.as_deref(), Some("Invalid code"));
                assert_eq!(form.verification_code, "000000");
            })
            .run();
    }

    #[test]
    fn test_editing_clears_error() {
        let mut state = awaiting_code("+15551234567", "000000");
        if let Modal::Open(form) = &mut state.modal {
            form.error = Some("Invalid code".to_string());
        }

        test()
            .given_state(state)
            .when_action(AuthFlowAction::VerificationCodeChanged("1".to_string()))
            .then_state(|state| {
                let form = form(state);
                assert_eq!(form.error, None);
                assert_eq!(form.verification_code, "1");
            })
            .run();
    }

    #[test]
    fn test_go_back_keeps_phone_drops_code() {
        test()
            .given_state(awaiting_code("+15551234567", "123456"))
            .when_actions([AuthFlowAction::SubmitVerification, AuthFlowAction::GoBack])
            .then_state(|state| {
                let form = form(state);
                assert_eq!(form.step, FlowStep::Phone);
                assert_eq!(form.phone_number, "+15551234567");
                assert_eq!(form.verification_code, "");
                assert!(!form.loading);
                assert_eq!(form.pending, None);
            })
            .run();
    }

    #[test]
    fn test_go_back_from_phone_is_ignored() {
        test()
            .given_state(open_with_phone("+15551234567"))
            .when_action(AuthFlowAction::GoBack)
            .then_state(|state| {
                assert_eq!(form(state).step, FlowStep::Phone);
                assert_eq!(form(state).phone_number, "+15551234567");
            })
            .run();
    }

    #[test]
    fn test_response_after_close_is_discarded() {
        test()
            .given_state(open_with_phone("+15551234567"))
            .when_actions([
                AuthFlowAction::SubmitPhone,
                AuthFlowAction::Close,
                AuthFlowAction::CodeSent {
                    request: RequestId(1),
                },
            ])
            .then_state(|state| assert!(!state.is_open()))
            .run();
    }

    #[test]
    fn test_response_after_reopen_is_discarded() {
        test()
            .given_state(open_with_phone("+15551234567"))
            .when_actions([
                AuthFlowAction::SubmitPhone,
                AuthFlowAction::Close,
                AuthFlowAction::Open,
                AuthFlowAction::CodeSent {
                    request: RequestId(1),
                },
            ])
            .then_state(|state| assert_eq!(form(state), FlowForm::default()))
            .run();
    }

    #[test]
    fn test_verified_response_after_go_back_is_discarded() {
        test()
            .given_state(awaiting_code("+15551234567", "123456"))
            .when_actions([
                AuthFlowAction::SubmitVerification,
                AuthFlowAction::GoBack,
                AuthFlowAction::CodeVerified {
                    request: RequestId(1),
                    identity: MockVerificationService::default_identity(),
                },
            ])
            .then_state(|state| {
                assert!(state.is_open());
                assert_eq!(form(state).step, FlowStep::Phone);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 3);
                assert!(effects[1].is_none());
                assert!(effects[2].is_none());
            })
            .run();
    }
}
