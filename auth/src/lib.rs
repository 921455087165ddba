//! # CrowdBolt Authentication
//!
//! Client-side authentication for the CrowdBolt ticket marketplace, built
//! as reducers and effects.
//!
//! ## Pieces
//!
//! - **Session store** ([`SessionReducer`]): the single source of truth for
//!   the signed-in user, access/refresh tokens, and loading/error flags.
//!   Call sites reach it through the [`SessionAccess`] capability.
//! - **Auth flow** ([`AuthFlowReducer`]): the phone → verification code
//!   state machine behind the sign-in modal. On confirmed success it closes
//!   and hands the verified identity to the session store.
//!
//! ## Architecture
//!
//! ```text
//! AuthFlowAction → AuthFlowReducer → (AuthFlowState, Effects)
//!                                         │
//!               VerificationService ◄─────┤ send code / verify code
//!               SessionAccess       ◄─────┘ SetUser, then SetTokens
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use crowdbolt_auth::*;
//!
//! let session = SessionHandle::new();
//! let flow = AuthFlowStore::new(
//!     AuthFlowState::default(),
//!     AuthFlowReducer::new(),
//!     AuthFlowEnvironment::new(HttpVerificationService::new(ApiConfig::from_env())?, session.clone()),
//! );
//!
//! flow.send(AuthFlowAction::Open).await?;
//! flow.send(AuthFlowAction::PhoneNumberChanged("+15551234567".into())).await?;
//! flow.send(AuthFlowAction::SubmitPhone).await?.wait().await;
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod actions;
pub mod config;
pub mod constants;
pub mod environment;
pub mod error;
pub mod providers;
pub mod reducers;
pub mod state;

#[cfg(feature = "test-utils")]
pub mod mocks;

pub use actions::{AuthFlowAction, SessionAction};
pub use config::ApiConfig;
pub use environment::{AuthFlowEnvironment, SessionEnvironment};
pub use error::{AuthError, Result};
pub use providers::{HttpVerificationService, SessionAccess, SessionHandle, VerificationService};
pub use reducers::{AuthFlowReducer, SessionReducer};
pub use state::{
    AuthFlowState, FlowForm, FlowStep, Modal, RequestId, Role, SessionState, TokenPair, User,
    UserPatch, VerifiedIdentity,
};

/// Store running the session reducer.
pub type SessionStore =
    crowdbolt_runtime::Store<SessionState, SessionAction, SessionEnvironment, SessionReducer>;

/// Store running the auth flow reducer for a given verification backend
/// and session capability.
pub type AuthFlowStore<V, S> = crowdbolt_runtime::Store<
    AuthFlowState,
    AuthFlowAction,
    AuthFlowEnvironment<V, S>,
    AuthFlowReducer<V, S>,
>;
