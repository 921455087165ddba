//! Phone sign-in walkthrough
//!
//! Opens the sign-in modal, requests a code, verifies it, and prints the
//! session store before and after.
//!
//! ```text
//! phone-login [PHONE] [CODE]
//! ```
//!
//! With `CROWDBOLT_API_URL` set (directly or in `.env`) the real API is
//! called; otherwise an in-memory backend that accepts any code is used.

use anyhow::{bail, Context};
use crowdbolt_auth::mocks::MockVerificationService;
use crowdbolt_auth::{
    constants::env_vars, ApiConfig, AuthFlowAction, AuthFlowEnvironment, AuthFlowReducer,
    AuthFlowState, AuthFlowStore, HttpVerificationService, SessionAccess, SessionHandle,
    SessionState, VerificationService,
};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PHONE: &str = "+15551234567";
const DEFAULT_CODE: &str = "123456";

/// Longest we wait for one backend round-trip and its handoff.
const STEP_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phone_login=info,crowdbolt_auth=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let phone = args.next().unwrap_or_else(|| DEFAULT_PHONE.to_string());
    let code = args.next().unwrap_or_else(|| DEFAULT_CODE.to_string());

    let session = SessionHandle::new();
    print_session("Before sign-in", &session.snapshot().await);

    if std::env::var(env_vars::API_URL).is_ok() {
        let config = ApiConfig::from_env();
        tracing::info!(base_url = %config.base_url, "Using CrowdBolt API");
        let verifier = HttpVerificationService::new(config)?;
        sign_in(verifier, &session, &phone, &code).await?;
    } else {
        tracing::info!("{} not set, using in-memory backend", env_vars::API_URL);
        let verifier = MockVerificationService::new().with_latency(Duration::from_millis(300));
        sign_in(verifier, &session, &phone, &code).await?;
    }

    print_session("After sign-in", &session.snapshot().await);

    session
        .store()
        .shutdown(Duration::from_secs(5))
        .await
        .context("session store did not shut down cleanly")?;

    Ok(())
}

/// Drive the modal through both steps.
async fn sign_in<V>(
    verifier: V,
    session: &SessionHandle,
    phone: &str,
    code: &str,
) -> anyhow::Result<()>
where
    V: VerificationService + Clone + 'static,
{
    let flow = AuthFlowStore::new(
        AuthFlowState::default(),
        AuthFlowReducer::new(),
        AuthFlowEnvironment::new(verifier, session.clone()),
    );

    for action in [
        AuthFlowAction::Open,
        AuthFlowAction::PhoneNumberChanged(phone.to_string()),
        AuthFlowAction::SubmitPhone,
    ] {
        flow.send(action).await?.wait_with_timeout(STEP_TIMEOUT).await?;
    }

    if let Some(error) = flow.state(|s| s.form().and_then(|f| f.error.clone())).await {
        bail!("could not send verification code: {error}");
    }
    println!("\n>>> Code sent to {phone}");

    for action in [
        AuthFlowAction::VerificationCodeChanged(code.to_string()),
        AuthFlowAction::SubmitVerification,
    ] {
        flow.send(action).await?.wait_with_timeout(STEP_TIMEOUT).await?;
    }

    if let Some(error) = flow.state(|s| s.form().and_then(|f| f.error.clone())).await {
        bail!("verification failed: {error}");
    }
    if flow.state(AuthFlowState::is_open).await {
        bail!("verification code {code:?} was not accepted for submission");
    }
    println!(">>> Verified, modal closed");

    flow.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}

fn print_session(label: &str, state: &SessionState) {
    println!("\n=== {label} ===");
    match &state.user {
        Some(user) => println!(
            "  user:          {} <{}> ({}, verified: {})",
            user.username, user.email, user.role, user.is_verified
        ),
        None => println!("  user:          -"),
    }
    println!("  authenticated: {}", state.is_authenticated);
    println!("  access token:  {}", state.token.as_deref().unwrap_or("-"));
    println!("  refresh token: {}", state.refresh_token.as_deref().unwrap_or("-"));
}
