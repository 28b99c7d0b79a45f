//! Admin authentication.
//!
//! The [`IdentityProvider`] trait abstracts the hosted identity service:
//! email/password sign-in, sign-out, and a stream of [`AuthState`]
//! transitions. [`AuthGate`] turns that stream into the admin route's
//! two-way choice between the console and the login form.

pub mod error;
pub mod firebase;
pub mod gate;
pub mod memory;
pub mod session;

use async_trait::async_trait;
use tokio::sync::watch;

pub use error::AuthError;
pub use firebase::FirebaseAuth;
pub use gate::{AdminView, AuthGate, LoginForm};
pub use memory::MemoryIdentity;
pub use session::{AuthState, Session};

/// Email/password identity service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sign in and, on success, emit [`AuthState::Authenticated`].
    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError>;

    /// Drop the session and emit [`AuthState::Unauthenticated`].
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Receiver of every auth-state transition. The current state is
    /// readable immediately.
    fn on_auth_state_changed(&self) -> watch::Receiver<AuthState>;
}
