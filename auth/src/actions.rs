//! Authentication actions.
//!
//! [`SessionAction`] is the complete set of session transitions.
//! [`AuthFlowAction`] mixes user input (`Open`, `SubmitPhone`, ...) with
//! the results the verification effects feed back (`CodeSent`, ...).

use crate::error::AuthError;
use crate::state::{RequestId, TokenPair, User, UserPatch, VerifiedIdentity};

/// Session store transitions.
///
/// None of these can fail; each is total over its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Set `is_loading`.
    SetLoading(bool),

    /// Record the last error message; nothing else changes.
    SetError(String),

    /// Sign a user in: replaces the user, sets `is_authenticated`,
    /// clears `error`.
    SetUser(User),

    /// Replace both tokens together.
    SetTokens(TokenPair),

    /// Merge fields into the current user; ignored when signed out.
    UpdateUser(UserPatch),

    /// Sign out: resets user, tokens, `is_authenticated` and `error`.
    ClearAuth,
}

/// Sign-in flow inputs and feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFlowAction {
    // ═══════════════════════════════════════════════════════════════
    // User Input
    // ═══════════════════════════════════════════════════════════════

    /// Show the modal with a fresh form.
    Open,

    /// Hide the modal and discard everything entered.
    Close,

    /// Phone number input changed.
    PhoneNumberChanged(String),

    /// Verification code input changed.
    VerificationCodeChanged(String),

    /// Request a verification code for the entered phone number.
    SubmitPhone,

    /// Verify the entered code.
    SubmitVerification,

    /// Return from code entry to phone entry.
    GoBack,

    // ═══════════════════════════════════════════════════════════════
    // Effect Feedback
    // ═══════════════════════════════════════════════════════════════

    /// The backend accepted the phone number and sent a code.
    CodeSent {
        /// Submission this answers.
        request: RequestId,
    },

    /// Sending the code failed.
    CodeSendFailed {
        /// Submission this answers.
        request: RequestId,
        /// Why it failed.
        error: AuthError,
    },

    /// The code was accepted.
    CodeVerified {
        /// Submission this answers.
        request: RequestId,
        /// The signed-in user and their tokens.
        identity: VerifiedIdentity,
    },

    /// The code was rejected or the backend failed.
    VerificationFailed {
        /// Submission this answers.
        request: RequestId,
        /// Why it failed.
        error: AuthError,
    },
}

impl AuthFlowAction {
    /// The submission a feedback action answers; `None` for user input.
    #[must_use]
    pub const fn request(&self) -> Option<RequestId> {
        match self {
            Self::CodeSent { request }
            | Self::CodeSendFailed { request, .. }
            | Self::CodeVerified { request, .. }
            | Self::VerificationFailed { request, .. } => Some(*request),
            _ => None,
        }
    }
}
