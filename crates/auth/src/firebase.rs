//! Hosted identity service client.
//!
//! Signs in through the Identity Toolkit `accounts:signInWithPassword`
//! endpoint and keeps the ID token fresh through the secure-token endpoint.
//! Sign-out is local: the session is dropped and no request is made.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::AuthError;
use crate::session::{AuthState, Session};
use crate::IdentityProvider;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Default Identity Toolkit base URL.
pub const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Default secure-token base URL.
pub const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";

/// Lifetime assumed when the provider omits `expiresIn`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Pause before the single retry of a refresh that could not reach the
/// token endpoint.
const REFRESH_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Shortest gap between two scheduled refreshes.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/* --------------------------------------------------------------------------
Wire types
-------------------------------------------------------------------------- */

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/* --------------------------------------------------------------------------
Client
-------------------------------------------------------------------------- */

/// [`IdentityProvider`] backed by the hosted identity service.
///
/// Cheap to clone; clones share the session.
#[derive(Clone)]
pub struct FirebaseAuth {
    inner: Arc<Inner>,
}

struct Inner {
    client: reqwest::Client,
    api_key: String,
    identity_url: String,
    token_url: String,
    state: watch::Sender<AuthState>,
}

impl FirebaseAuth {
    /// Create a client for the project owning `api_key`.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoints(api_key, IDENTITY_TOOLKIT_URL, SECURE_TOKEN_URL)
    }

    /// Create a client against non-default endpoints (emulator, tests).
    pub fn with_endpoints(
        api_key: impl Into<String>,
        identity_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::Unauthenticated);
        Self {
            inner: Arc::new(Inner {
                client: reqwest::Client::new(),
                api_key: api_key.into(),
                identity_url: identity_url.into().trim_end_matches('/').to_string(),
                token_url: token_url.into().trim_end_matches('/').to_string(),
                state,
            }),
        }
    }

    /// Current auth state.
    pub fn state(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    /// Exchange the refresh token for a new ID token.
    ///
    /// If the provider rejects the refresh token the session is dropped and
    /// [`AuthState::Unauthenticated`] is emitted.
    pub async fn refresh(&self) -> Result<Session, AuthError> {
        let Some(current) = self.state().session().cloned() else {
            return Err(AuthError::SessionExpired);
        };

        let response = self
            .inner
            .client
            .post(format!("{}/token", self.inner.token_url))
            .query(&[("key", self.inner.api_key.as_str())])
            .json(&serde_json::json!({
                "grant_type": "refresh_token",
                "refresh_token": current.refresh_token,
            }))
            .send()
            .await?;

        let refreshed: RefreshResponse = match parse_response(response).await {
            Ok(r) => r,
            Err(e) => {
                if !matches!(e, AuthError::Request(_)) {
                    self.inner.state.send_replace(AuthState::Unauthenticated);
                }
                return Err(e);
            }
        };

        let session = Session {
            id_token: refreshed.id_token,
            refresh_token: refreshed.refresh_token,
            expires_at: expires_at(refreshed.expires_in.as_deref()),
            ..current
        };
        self.inner
            .state
            .send_replace(AuthState::Authenticated(session.clone()));
        tracing::debug!(uid = %session.uid, "ID token refreshed");
        Ok(session)
    }

    /// Refresh once more after [`REFRESH_RETRY_DELAY`] if the token
    /// endpoint could not be reached.
    async fn refresh_with_retry(&self) -> Result<Session, AuthError> {
        match self.refresh().await {
            Err(AuthError::Request(e)) => {
                tracing::debug!(error = %e, "Token endpoint unreachable, retrying");
                tokio::time::sleep(REFRESH_RETRY_DELAY).await;
                self.refresh().await
            }
            result => result,
        }
    }

    /// Refresh the ID token shortly before each expiry until `cancel` fires.
    ///
    /// An unreachable token endpoint is retried once; any other failure, or
    /// a second transport failure, signs the admin out. Refreshes are at
    /// least [`MIN_REFRESH_INTERVAL`] apart even when the provider hands out
    /// tokens shorter-lived than the refresh margin.
    pub fn spawn_token_refresh(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let auth = self.clone();
        tokio::spawn(async move {
            let mut state = auth.on_auth_state_changed();
            let mut last_refresh: Option<Instant> = None;
            loop {
                let due = state
                    .borrow_and_update()
                    .session()
                    .map(|s| s.refresh_due_in(Utc::now()))
                    .map(|delay| match last_refresh {
                        Some(at) => delay.max(MIN_REFRESH_INTERVAL.saturating_sub(at.elapsed())),
                        None => delay,
                    });

                let wait = async {
                    match due {
                        Some(delay) => tokio::time::sleep(delay).await,
                        None => std::future::pending().await,
                    }
                };

                tokio::select! {
                    _ = cancel.cancelled() => return,
                    changed = state.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                    _ = wait => {
                        last_refresh = Some(Instant::now());
                        tokio::select! {
                            _ = cancel.cancelled() => return,
                            result = auth.refresh_with_retry() => {
                                if let Err(e) = result {
                                    tracing::warn!(error = %e, "Token refresh failed, signing out");
                                    auth.inner.state.send_replace(AuthState::Unauthenticated);
                                }
                            }
                        }
                    }
                }
            }
        })
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuth {
    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let response = self
            .inner
            .client
            .post(format!(
                "{}/accounts:signInWithPassword",
                self.inner.identity_url
            ))
            .query(&[("key", self.inner.api_key.as_str())])
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await?;

        let signed_in: SignInResponse = parse_response(response).await?;
        let session = Session {
            uid: signed_in.local_id,
            email: if signed_in.email.is_empty() {
                email.to_string()
            } else {
                signed_in.email
            },
            id_token: signed_in.id_token,
            refresh_token: signed_in.refresh_token,
            expires_at: expires_at(signed_in.expires_in.as_deref()),
        };

        tracing::info!(uid = %session.uid, "Admin signed in");
        self.inner
            .state
            .send_replace(AuthState::Authenticated(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.inner.state.send_replace(AuthState::Unauthenticated);
        tracing::info!("Admin signed out");
        Ok(())
    }

    fn on_auth_state_changed(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }
}

// ---- private helpers ----

fn expires_at(expires_in: Option<&str>) -> chrono::DateTime<Utc> {
    let secs = expires_in
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(DEFAULT_EXPIRES_IN_SECS);
    Utc::now() + chrono::Duration::seconds(secs)
}

/// Decode a success body, or map the provider's error envelope to an
/// [`AuthError`].
async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AuthError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let code = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("HTTP_{}", status.as_u16()));
        return Err(AuthError::from_code(&code));
    }
    Ok(response.json::<T>().await?)
}
