//! In-process identity provider for tests and offline runs.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::watch;

use crate::error::AuthError;
use crate::session::{AuthState, Session};
use crate::IdentityProvider;

/// Failed attempts allowed before sign-in is throttled.
pub const MAX_FAILED_ATTEMPTS: u32 = 5;

struct Account {
    uid: String,
    password: String,
    disabled: bool,
}

/// [`IdentityProvider`] over a fixed set of accounts.
pub struct MemoryIdentity {
    accounts: Mutex<HashMap<String, Account>>,
    failed_attempts: Mutex<u32>,
    state: watch::Sender<AuthState>,
}

impl Default for MemoryIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryIdentity {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AuthState::Unauthenticated);
        Self {
            accounts: Mutex::new(HashMap::new()),
            failed_attempts: Mutex::new(0),
            state,
        }
    }

    /// Register an account.
    pub fn with_account(self, email: &str, password: &str) -> Self {
        let uid = format!("uid-{}", self.lock_accounts().len() + 1);
        self.lock_accounts().insert(
            email.to_string(),
            Account {
                uid,
                password: password.to_string(),
                disabled: false,
            },
        );
        self
    }

    /// Disable an account; later sign-ins fail with
    /// [`AuthError::UserDisabled`].
    pub fn disable(&self, email: &str) {
        if let Some(account) = self.lock_accounts().get_mut(email) {
            account.disabled = true;
        }
    }

    fn lock_accounts(&self) -> std::sync::MutexGuard<'_, HashMap<String, Account>> {
        self.accounts.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record_failure(&self) -> AuthError {
        let mut failed = self.failed_attempts.lock().unwrap_or_else(|e| e.into_inner());
        *failed += 1;
        AuthError::InvalidCredentials
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        if *self.failed_attempts.lock().unwrap_or_else(|e| e.into_inner()) >= MAX_FAILED_ATTEMPTS {
            return Err(AuthError::TooManyAttempts);
        }

        let matched = self
            .lock_accounts()
            .get(email)
            .filter(|account| account.password == password)
            .map(|account| (account.uid.clone(), account.disabled));
        let Some((uid, disabled)) = matched else {
            return Err(self.record_failure());
        };
        if disabled {
            return Err(AuthError::UserDisabled);
        }

        let session = Session {
            email: email.to_string(),
            id_token: format!("memory-id-{uid}"),
            refresh_token: format!("memory-refresh-{uid}"),
            expires_at: Utc::now() + chrono::Duration::hours(1),
            uid,
        };

        *self.failed_attempts.lock().unwrap_or_else(|e| e.into_inner()) = 0;
        self.state
            .send_replace(AuthState::Authenticated(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.state.send_replace(AuthState::Unauthenticated);
        Ok(())
    }

    fn on_auth_state_changed(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn provider() -> MemoryIdentity {
        MemoryIdentity::new().with_account("admin@example.com", "hunter22")
    }

    #[tokio::test]
    async fn sign_in_emits_authenticated() {
        let identity = provider();
        let mut state = identity.on_auth_state_changed();
        assert!(!state.borrow().is_authenticated());

        let session = identity
            .sign_in_with_email_and_password("admin@example.com", "hunter22")
            .await
            .unwrap();

        state.changed().await.unwrap();
        assert_eq!(state.borrow().session(), Some(&session));
    }

    #[tokio::test]
    async fn wrong_password_leaves_state_unauthenticated() {
        let identity = provider();
        let result = identity
            .sign_in_with_email_and_password("admin@example.com", "nope")
            .await;
        assert_matches!(result, Err(AuthError::InvalidCredentials));
        assert!(!identity.on_auth_state_changed().borrow().is_authenticated());
    }

    #[tokio::test]
    async fn repeated_failures_are_throttled() {
        let identity = provider();
        for _ in 0..MAX_FAILED_ATTEMPTS {
            let _ = identity
                .sign_in_with_email_and_password("ghost@example.com", "x")
                .await;
        }
        assert_matches!(
            identity
                .sign_in_with_email_and_password("admin@example.com", "hunter22")
                .await,
            Err(AuthError::TooManyAttempts)
        );
    }

    #[tokio::test]
    async fn disabled_accounts_are_rejected() {
        let identity = provider();
        identity.disable("admin@example.com");
        assert_matches!(
            identity
                .sign_in_with_email_and_password("admin@example.com", "hunter22")
                .await,
            Err(AuthError::UserDisabled)
        );
    }

    #[tokio::test]
    async fn sign_out_emits_unauthenticated() {
        let identity = provider();
        identity
            .sign_in_with_email_and_password("admin@example.com", "hunter22")
            .await
            .unwrap();
        let mut state = identity.on_auth_state_changed();

        identity.sign_out().await.unwrap();
        state.changed().await.unwrap();
        assert_eq!(*state.borrow(), AuthState::Unauthenticated);
    }
}
