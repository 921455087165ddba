//! Verification backend trait.

use crate::error::Result;
use crate::state::VerifiedIdentity;

/// Phone verification backend.
///
/// Abstracts over the service that texts one-time codes and checks them.
pub trait VerificationService: Send + Sync {
    /// Send a verification code to a phone number.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The backend cannot be reached
    /// - The backend rejects the phone number
    fn send_verification_code(
        &self,
        phone_number: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Check a code previously sent to `phone_number`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The backend cannot be reached
    /// - The code is wrong or expired
    /// - The response cannot be decoded
    fn verify_code(
        &self,
        phone_number: &str,
        code: &str,
    ) -> impl std::future::Future<Output = Result<VerifiedIdentity>> + Send;
}
