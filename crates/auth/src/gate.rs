//! Admin route gate.
//!
//! [`AuthGate`] follows the identity provider's auth-state stream and
//! decides what the admin route shows. It never changes state itself:
//! sign-in and sign-out go through the provider, and the gate only sees the
//! transitions the provider emits.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use validator::Validate;

use crate::error::AuthError;
use crate::session::{AuthState, Session};
use crate::IdentityProvider;

/// Shown when the login form fails local validation.
pub const INVALID_FORM_MESSAGE: &str = "Please enter a valid email and password.";

/// What the admin route renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminView {
    Console,
    Login,
}

impl From<&AuthState> for AdminView {
    fn from(state: &AuthState) -> Self {
        match state {
            AuthState::Authenticated(_) => AdminView::Console,
            AuthState::Unauthenticated => AdminView::Login,
        }
    }
}

/// Login form state, including the inline error message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[serde(skip)]
    pub error: Option<String>,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            error: None,
        }
    }
}

/// Decides between the admin console and the login form.
#[derive(Clone)]
pub struct AuthGate {
    provider: Arc<dyn IdentityProvider>,
    state: watch::Receiver<AuthState>,
}

impl AuthGate {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let state = provider.on_auth_state_changed();
        Self { provider, state }
    }

    pub fn view(&self) -> AdminView {
        AdminView::from(&*self.state.borrow())
    }

    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session().cloned()
    }

    /// Submit the login form.
    ///
    /// On failure the form's `error` holds a human-readable message and the
    /// state stays unauthenticated. On success the password is cleared.
    pub async fn login(&self, form: &mut LoginForm) -> bool {
        form.error = None;

        if form.validate().is_err() {
            form.error = Some(INVALID_FORM_MESSAGE.to_string());
            return false;
        }

        match self
            .provider
            .sign_in_with_email_and_password(form.email.trim(), &form.password)
            .await
        {
            Ok(_) => {
                form.password.clear();
                true
            }
            Err(e) => {
                tracing::warn!(email = %form.email, error = %e, "Admin sign-in failed");
                form.error = Some(e.user_message().to_string());
                false
            }
        }
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.provider.sign_out().await
    }

    /// Wait for the next transition and return the view it selects.
    ///
    /// Returns `None` once the provider is gone.
    pub async fn changed(&mut self) -> Option<AdminView> {
        self.state.changed().await.ok()?;
        Some(self.view())
    }
}
