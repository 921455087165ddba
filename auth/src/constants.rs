//! Authentication constants.

/// Number of characters in a verification code.
///
/// Code input is capped at this length and submission requires it.
pub const VERIFICATION_CODE_LENGTH: usize = 6;

/// Verification backend endpoint paths, relative to the API base URL.
pub mod endpoints {
    /// Request an SMS verification code for a phone number.
    pub const SEND_CODE: &str = "/api/auth/phone/send-code/";

    /// Exchange a phone number and code for a user and token pair.
    pub const VERIFY_CODE: &str = "/api/auth/phone/verify/";
}

/// Environment variables read by [`crate::config::ApiConfig::from_env`].
pub mod env_vars {
    /// API base URL.
    pub const API_URL: &str = "CROWDBOLT_API_URL";

    /// Per-request timeout in whole seconds.
    pub const API_TIMEOUT_SECS: &str = "CROWDBOLT_API_TIMEOUT_SECS";
}

/// API base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Request timeout used when none is configured.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 10;
