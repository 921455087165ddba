//! Authentication state types.
//!
//! Two independent states live here: [`SessionState`], shared by the whole
//! application, and [`AuthFlowState`], owned by one sign-in modal.

use crate::constants::VERIFICATION_CODE_LENGTH;
use crate::error::{AuthError, Result};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// User & Credentials
// ═══════════════════════════════════════════════════════════════════════

/// Marketplace role of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Buys tickets (default for new accounts).
    #[default]
    Buyer,
    /// Lists tickets for sale.
    Seller,
    /// Marketplace administrator.
    Admin,
}

impl Role {
    /// Get the role name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Seller => "seller",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verified user as held by the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend user identifier.
    pub id: String,

    /// Email address.
    pub email: String,

    /// Display handle.
    pub username: String,

    /// Marketplace role.
    pub role: Role,

    /// Whether the email address has been verified.
    pub is_verified: bool,

    /// Whether identity verification has been completed.
    pub identity_verified: bool,
}

impl User {
    /// Whether this user has the buyer role.
    #[must_use]
    pub fn is_buyer(&self) -> bool {
        self.role == Role::Buyer
    }

    /// Whether this user has the seller role.
    #[must_use]
    pub fn is_seller(&self) -> bool {
        self.role == Role::Seller
    }

    /// Whether this user has the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Shallow-merge a patch into this user.
    ///
    /// Only fields present in `patch` change.
    pub fn apply(&mut self, patch: UserPatch) {
        let UserPatch {
            id,
            email,
            username,
            role,
            is_verified,
            identity_verified,
        } = patch;

        if let Some(id) = id {
            self.id = id;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(username) = username {
            self.username = username;
        }
        if let Some(role) = role {
            self.role = role;
        }
        if let Some(is_verified) = is_verified {
            self.is_verified = is_verified;
        }
        if let Some(identity_verified) = identity_verified {
            self.identity_verified = identity_verified;
        }
    }
}

/// Partial update for a [`User`]; `None` leaves a field untouched.
///
/// # Examples
///
/// ```
/// # use crowdbolt_auth::UserPatch;
/// let patch = UserPatch::default().is_verified(false).identity_verified(true);
/// assert_eq!(patch.email, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    /// New identifier.
    pub id: Option<String>,
    /// New email address.
    pub email: Option<String>,
    /// New display handle.
    pub username: Option<String>,
    /// New role.
    pub role: Option<Role>,
    /// New email verification flag.
    pub is_verified: Option<bool>,
    /// New identity verification flag.
    pub identity_verified: Option<bool>,
}

impl UserPatch {
    /// Set the email address.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the display handle.
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the role.
    #[must_use]
    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Set the email verification flag.
    #[must_use]
    pub fn is_verified(mut self, value: bool) -> Self {
        self.is_verified = Some(value);
        self
    }

    /// Set the identity verification flag.
    #[must_use]
    pub fn identity_verified(mut self, value: bool) -> Self {
        self.identity_verified = Some(value);
        self
    }
}

/// Access and refresh token pair, always replaced together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token (opaque to the client).
    pub token: String,

    /// Long-lived refresh token (opaque to the client).
    pub refresh_token: String,
}

/// What a successful code verification yields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    /// The verified user.
    pub user: User,

    /// Credentials issued for the user.
    pub tokens: TokenPair,
}

// ═══════════════════════════════════════════════════════════════════════
// Session State
// ═══════════════════════════════════════════════════════════════════════

/// Process-wide session state.
///
/// `Default` is the signed-out initial state. Only
/// [`SessionReducer`](crate::reducers::SessionReducer) transitions it.
///
/// # Examples
///
/// ```
/// # use crowdbolt_auth::SessionState;
/// let state = SessionState::default();
/// assert!(state.user.is_none());
/// assert!(!state.is_authenticated);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Signed-in user (absent means unauthenticated).
    pub user: Option<User>,

    /// Access token.
    pub token: Option<String>,

    /// Refresh token.
    pub refresh_token: Option<String>,

    /// Set on user assignment, cleared on logout.
    pub is_authenticated: bool,

    /// Set by callers around async work.
    pub is_loading: bool,

    /// Last error message.
    pub error: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// Auth Flow State
// ═══════════════════════════════════════════════════════════════════════

/// Identifies one submission to the verification backend.
///
/// Ids increase monotonically for the lifetime of an [`AuthFlowState`],
/// across close and reopen, so a late response can always be told apart
/// from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stage of the sign-in form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowStep {
    /// Entering the phone number.
    #[default]
    Phone,
    /// Entering the code sent to the phone.
    Verification,
}

impl FlowStep {
    /// Get the step name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Verification => "verification",
        }
    }
}

/// Form state while the modal is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowForm {
    /// Current stage.
    pub step: FlowStep,

    /// Phone number entered in the phone stage.
    pub phone_number: String,

    /// Code entered in the verification stage.
    pub verification_code: String,

    /// A backend round-trip is pending.
    pub loading: bool,

    /// Message from the last failed round-trip.
    pub error: Option<String>,

    /// The submission whose response is awaited.
    pub pending: Option<RequestId>,
}

impl FlowForm {
    /// Check whether the phone number may be submitted now.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidTransition`] outside the phone stage
    /// - [`AuthError::RequestInFlight`] while a request is pending
    /// - [`AuthError::EmptyPhoneNumber`] if nothing was entered
    pub fn check_phone_submission(&self) -> Result<()> {
        if self.step != FlowStep::Phone {
            return Err(AuthError::InvalidTransition {
                action: "submit phone number",
                state: "entering the verification code",
            });
        }
        if self.loading {
            return Err(AuthError::RequestInFlight);
        }
        if self.phone_number.trim().is_empty() {
            return Err(AuthError::EmptyPhoneNumber);
        }
        Ok(())
    }

    /// Check whether the verification code may be submitted now.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidTransition`] outside the verification stage
    /// - [`AuthError::RequestInFlight`] while a request is pending
    /// - [`AuthError::IncompleteCode`] if fewer than six characters were entered
    pub fn check_code_submission(&self) -> Result<()> {
        if self.step != FlowStep::Verification {
            return Err(AuthError::InvalidTransition {
                action: "submit verification code",
                state: "entering the phone number",
            });
        }
        if self.loading {
            return Err(AuthError::RequestInFlight);
        }
        let actual = self.verification_code.chars().count();
        if actual < VERIFICATION_CODE_LENGTH {
            return Err(AuthError::IncompleteCode {
                expected: VERIFICATION_CODE_LENGTH,
                actual,
            });
        }
        Ok(())
    }

    /// Whether the submit control for the current step is enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        match self.step {
            FlowStep::Phone => self.check_phone_submission().is_ok(),
            FlowStep::Verification => self.check_code_submission().is_ok(),
        }
    }
}

/// Visibility of the sign-in modal, wrapping the form while open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Modal {
    /// Hidden; nothing entered is retained.
    #[default]
    Closed,
    /// Shown with the given form.
    Open(FlowForm),
}

/// State of the sign-in flow.
///
/// # Examples
///
/// ```
/// # use crowdbolt_auth::AuthFlowState;
/// let state = AuthFlowState::default();
/// assert!(!state.is_open());
/// assert!(state.form().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthFlowState {
    /// Modal visibility and form.
    pub modal: Modal,

    /// Last request id handed out.
    last_request: u64,
}

impl AuthFlowState {
    /// Whether the modal is shown.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.modal, Modal::Open(_))
    }

    /// The open form, if any.
    #[must_use]
    pub const fn form(&self) -> Option<&FlowForm> {
        match &self.modal {
            Modal::Open(form) => Some(form),
            Modal::Closed => None,
        }
    }

    /// The open form, mutably.
    pub(crate) fn form_mut(&mut self) -> Option<&mut FlowForm> {
        match &mut self.modal {
            Modal::Open(form) => Some(form),
            Modal::Closed => None,
        }
    }

    /// Mark the open form as waiting on a new request and return its id.
    ///
    /// Clears the displayed error. Returns `None` while closed.
    pub(crate) fn start_request(&mut self) -> Option<RequestId> {
        let Modal::Open(form) = &mut self.modal else {
            return None;
        };

        self.last_request += 1;
        let request = RequestId(self.last_request);
        form.loading = true;
        form.error = None;
        form.pending = Some(request);
        Some(request)
    }
}
