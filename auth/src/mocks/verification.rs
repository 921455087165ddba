//! Mock verification backend for testing.

use crate::error::Result;
use crate::providers::VerificationService;
use crate::state::{Role, TokenPair, User, VerifiedIdentity};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// A call received by [`MockVerificationService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationCall {
    /// `send_verification_code`
    SendCode {
        /// Phone number the code was requested for.
        phone_number: String,
    },
    /// `verify_code`
    VerifyCode {
        /// Phone number being verified.
        phone_number: String,
        /// Code submitted.
        code: String,
    },
}

#[derive(Debug)]
struct Script {
    send_results: VecDeque<Result<()>>,
    verify_results: VecDeque<Result<VerifiedIdentity>>,
    identity: VerifiedIdentity,
    latency: Duration,
    calls: Vec<VerificationCall>,
}

/// Mock verification backend.
///
/// Succeeds by default, answering every verification with
/// [`MockVerificationService::default_identity`]. Queue results to script
/// failures; queued results are consumed one per call, in order. Clones
/// share the script and the call log.
#[derive(Debug, Clone)]
pub struct MockVerificationService {
    script: Arc<Mutex<Script>>,
}

impl MockVerificationService {
    /// Create a mock that accepts every phone number and code.
    #[must_use]
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                send_results: VecDeque::new(),
                verify_results: VecDeque::new(),
                identity: Self::default_identity(),
                latency: Duration::ZERO,
                calls: Vec::new(),
            })),
        }
    }

    /// The buyer account returned when nothing else is configured.
    #[must_use]
    pub fn default_identity() -> VerifiedIdentity {
        VerifiedIdentity {
            user: User {
                id: "1".to_string(),
                email: "test@crowdbolt.com".to_string(),
                username: "testuser".to_string(),
                role: Role::Buyer,
                is_verified: true,
                identity_verified: false,
            },
            tokens: TokenPair {
                token: "mock-access-token".to_string(),
                refresh_token: "mock-refresh-token".to_string(),
            },
        }
    }

    /// Delay every response by `latency`.
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().latency = latency;
        self
    }

    /// Answer successful verifications with `identity`.
    #[must_use]
    pub fn with_identity(self, identity: VerifiedIdentity) -> Self {
        self.lock().identity = identity;
        self
    }

    /// Queue the result of the next unscripted `send_verification_code`.
    pub fn queue_send_result(&self, result: Result<()>) {
        self.lock().send_results.push_back(result);
    }

    /// Queue the result of the next unscripted `verify_code`.
    pub fn queue_verify_result(&self, result: Result<VerifiedIdentity>) {
        self.lock().verify_results.push_back(result);
    }

    /// Every call received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<VerificationCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockVerificationService {
    fn default() -> Self {
        Self::new()
    }
}

impl VerificationService for MockVerificationService {
    fn send_verification_code(&self, phone_number: &str) -> impl Future<Output = Result<()>> + Send {
        let (result, latency) = {
            let mut script = self.lock();
            script.calls.push(VerificationCall::SendCode {
                phone_number: phone_number.to_string(),
            });
            (script.send_results.pop_front().unwrap_or(Ok(())), script.latency)
        };

        async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            result
        }
    }

    fn verify_code(
        &self,
        phone_number: &str,
        code: &str,
    ) -> impl Future<Output = Result<VerifiedIdentity>> + Send {
        let (result, latency) = {
            let mut script = self.lock();
            script.calls.push(VerificationCall::VerifyCode {
                phone_number: phone_number.to_string(),
                code: code.to_string(),
            });
            let result = match script.verify_results.pop_front() {
                Some(result) => result,
                None => Ok(script.identity.clone()),
            };
            (result, script.latency)
        };

        async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            result
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::AuthError;

    #[tokio::test]
    async fn test_defaults_succeed() {
        let mock = MockVerificationService::new();

        mock.send_verification_code("+15551234567").await.unwrap();
        let identity = mock.verify_code("+15551234567", "123456").await.unwrap();

        assert_eq!(identity, MockVerificationService::default_identity());
        assert_eq!(
            mock.calls(),
            vec![
                VerificationCall::SendCode {
                    phone_number: "+15551234567".to_string()
                },
                VerificationCall::VerifyCode {
                    phone_number: "+15551234567".to_string(),
                    code: "123456".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_queued_results_are_consumed_in_order() {
        let mock = MockVerificationService::new();
        let rejected = AuthError::ExternalService {
            reason: "Invalid code".to_string(),
        };
        mock.queue_verify_result(Err(rejected.clone()));

        assert_eq!(mock.verify_code("+1", "000000").await, Err(rejected));
        assert!(mock.verify_code("+1", "123456").await.is_ok());
    }

    #[tokio::test]
    async fn test_clones_share_call_log() {
        let mock = MockVerificationService::new();
        let clone = mock.clone();

        clone.send_verification_code("+1").await.unwrap();

        assert_eq!(mock.calls().len(), 1);
    }
}
