//! REST verification backend.
//!
//! Talks JSON to the CrowdBolt API:
//!
//! | Operation | Request | Success body |
//! |-----------|---------|--------------|
//! | send code | `POST {SEND_CODE}` `{"phone_number"}` | ignored (may be empty) |
//! | verify    | `POST {VERIFY_CODE}` `{"phone_number", "code"}` | `{"user", "access", "refresh"}` |
//!
//! Failures carry `{"error": "..."}` (or DRF's `{"detail": "..."}`), which
//! becomes [`AuthError::ExternalService`] so the modal can show it as is.

use crate::config::ApiConfig;
use crate::constants::endpoints;
use crate::error::{AuthError, Result};
use crate::providers::VerificationService;
use crate::state::{Role, TokenPair, User, VerifiedIdentity};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Verification backend reached over HTTP.
///
/// # Example
///
/// ```no_run
/// # use crowdbolt_auth::{ApiConfig, HttpVerificationService};
/// # fn main() -> crowdbolt_auth::Result<()> {
/// let verifier = HttpVerificationService::new(ApiConfig::from_env())?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct HttpVerificationService {
    /// HTTP client with the configured timeout.
    http_client: Client,

    /// Where the API lives.
    config: ApiConfig,
}

impl HttpVerificationService {
    /// Create a client for the configured API.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AuthError::Configuration(e.to_string()))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// POST a JSON body, returning the body of a 2xx response.
    async fn post<B>(&self, path: &str, body: &B) -> Result<Vec<u8>>
    where
        B: Serialize + Sync,
    {
        let url = self.config.endpoint(path);
        tracing::debug!(%url, "POST");

        let response = self.http_client.post(&url).json(body).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let reason = error_reason(status, &bytes);
            tracing::warn!(%status, %reason, "Verification backend rejected request");
            return Err(AuthError::ExternalService { reason });
        }

        Ok(bytes.to_vec())
    }
}

impl VerificationService for HttpVerificationService {
    async fn send_verification_code(&self, phone_number: &str) -> Result<()> {
        self.post(endpoints::SEND_CODE, &SendCodeRequest { phone_number })
            .await?;

        tracing::info!("Verification code sent");
        Ok(())
    }

    async fn verify_code(&self, phone_number: &str, code: &str) -> Result<VerifiedIdentity> {
        let body = self
            .post(endpoints::VERIFY_CODE, &VerifyCodeRequest { phone_number, code })
            .await?;

        let response: LoginResponse = decode(&body)?;
        let identity = response.into_identity();
        tracing::info!(user_id = %identity.user.id, "Verification code accepted");
        Ok(identity)
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| AuthError::UnexpectedResponse(e.to_string()))
}

/// Message to show for a failed response.
fn error_reason(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.error.or(body.detail))
        .filter(|reason| !reason.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP {status}"))
}

// ═══════════════════════════════════════════════════════════════════════
// Wire Types
// ═══════════════════════════════════════════════════════════════════════

#[derive(Serialize)]
struct SendCodeRequest<'a> {
    phone_number: &'a str,
}

#[derive(Serialize)]
struct VerifyCodeRequest<'a> {
    phone_number: &'a str,
    code: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

#[derive(Deserialize)]
struct LoginResponse {
    user: WireUser,
    access: String,
    refresh: String,
}

impl LoginResponse {
    fn into_identity(self) -> VerifiedIdentity {
        VerifiedIdentity {
            user: self.user.into_user(),
            tokens: TokenPair {
                token: self.access,
                refresh_token: self.refresh,
            },
        }
    }
}

/// User ids arrive as numbers from Django and as strings elsewhere.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Number(u64),
    Text(String),
}

#[derive(Deserialize)]
struct WireUser {
    id: WireId,
    email: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    role: Role,
    #[serde(default, alias = "isVerified")]
    is_verified: bool,
    #[serde(default, alias = "identityVerified")]
    identity_verified: bool,
}

impl WireUser {
    fn into_user(self) -> User {
        let id = match self.id {
            WireId::Number(n) => n.to_string(),
            WireId::Text(s) => s,
        };

        // Accounts without a handle go by the local part of their email.
        let username = self
            .username
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| {
                self.email
                    .split('@')
                    .next()
                    .unwrap_or_default()
                    .to_string()
            });

        User {
            id,
            email: self.email,
            username,
            role: self.role,
            is_verified: self.is_verified,
            identity_verified: self.identity_verified,
        }
    }
}
