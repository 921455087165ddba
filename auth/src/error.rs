//! Error types for the authentication flow.

use crowdbolt_runtime::StoreError;
use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Error taxonomy for the sign-in flow.
///
/// Validation errors are raised before anything is dispatched and leave
/// state untouched. External service errors come back from the verification
/// backend and are shown in the modal. The session store itself never fails;
/// a no-op such as patching an absent user is not an error at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Validation Errors
    // ═══════════════════════════════════════════════════════════

    /// No phone number was entered.
    #[error("Enter a phone number to continue")]
    EmptyPhoneNumber,

    /// The verification code is shorter than required.
    #[error("Verification code must be {expected} characters (got {actual})")]
    IncompleteCode {
        /// Required number of characters
        expected: usize,
        /// Characters entered
        actual: usize,
    },

    /// A previous submission has not resolved yet.
    #[error("A request is already in progress")]
    RequestInFlight,

    /// The action does not apply to the flow's current state.
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        /// The refused action
        action: &'static str,
        /// Where the flow was
        state: &'static str,
    },

    // ═══════════════════════════════════════════════════════════
    // External Service Errors
    // ═══════════════════════════════════════════════════════════

    /// The verification backend rejected the request.
    #[error("{reason}")]
    ExternalService {
        /// Message returned by the backend (or its HTTP status)
        reason: String,
    },

    /// The verification backend could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    /// The verification backend answered with a body we could not read.
    #[error("Unexpected response from server: {0}")]
    UnexpectedResponse(String),

    // ═══════════════════════════════════════════════════════════
    // Infrastructure
    // ═══════════════════════════════════════════════════════════

    /// The session store refused the transition (e.g., it is shutting down).
    #[error("Session store unavailable: {0}")]
    SessionUnavailable(String),

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AuthError {
    /// Whether the action was refused before any request was made.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyPhoneNumber
                | Self::IncompleteCode { .. }
                | Self::RequestInFlight
                | Self::InvalidTransition { .. }
        )
    }

    /// Whether the failure came from the verification backend or the network.
    #[must_use]
    pub const fn is_external(&self) -> bool {
        matches!(
            self,
            Self::ExternalService { .. } | Self::Network(_) | Self::UnexpectedResponse(_)
        )
    }
}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> Self {
        Self::SessionUnavailable(error.to_string())
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::UnexpectedResponse(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy() {
        assert!(AuthError::EmptyPhoneNumber.is_validation());
        assert!(AuthError::IncompleteCode { expected: 6, actual: 5 }.is_validation());
        assert!(AuthError::RequestInFlight.is_validation());
        assert!(!AuthError::RequestInFlight.is_external());

        let external = AuthError::ExternalService {
            reason: "Invalid code".to_string(),
        };
        assert!(external.is_external());
        assert!(!external.is_validation());
        assert!(AuthError::Network("refused".to_string()).is_external());

        let store = AuthError::from(StoreError::ShutdownInProgress);
        assert!(!store.is_external());
        assert!(!store.is_validation());
    }

    #[test]
    fn test_external_message_is_shown_verbatim() {
        let error = AuthError::ExternalService {
            reason: "Invalid code".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid code");
    }

    #[test]
    fn test_incomplete_code_message() {
        let error = AuthError::IncompleteCode {
            expected: 6,
            actual: 5,
        };
        assert_eq!(
            error.to_string(),
            "Verification code must be 6 characters (got 5)"
        );
    }
}
