use std::time::Duration;

use chrono::{DateTime, Utc};

/// How long before expiry an ID token is refreshed.
pub const REFRESH_MARGIN_SECS: i64 = 60;

/// A signed-in admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub uid: String,
    pub email: String,
    /// Short-lived token presented to the document store.
    pub id_token: String,
    /// Long-lived token exchanged for a fresh `id_token`.
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Time left until the token should be refreshed; zero when already due.
    pub fn refresh_due_in(&self, now: DateTime<Utc>) -> Duration {
        let due = self.expires_at - chrono::Duration::seconds(REFRESH_MARGIN_SECS);
        (due - now).to_std().unwrap_or(Duration::ZERO)
    }
}

/// The two states of the admin gate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    Authenticated(Session),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::Authenticated(session) => Some(session),
            AuthState::Unauthenticated => None,
        }
    }

    pub fn id_token(&self) -> Option<&str> {
        self.session().map(|s| s.id_token.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_in_secs: i64, now: DateTime<Utc>) -> Session {
        Session {
            uid: "u1".into(),
            email: "admin@example.com".into(),
            id_token: "id".into(),
            refresh_token: "refresh".into(),
            expires_at: now + chrono::Duration::seconds(expires_in_secs),
        }
    }

    #[test]
    fn refresh_is_due_one_margin_before_expiry() {
        let now = Utc::now();
        let s = session(3600, now);
        assert_eq!(
            s.refresh_due_in(now),
            Duration::from_secs((3600 - REFRESH_MARGIN_SECS) as u64)
        );
        assert!(!s.is_expired(now));
    }

    #[test]
    fn overdue_refresh_is_immediate() {
        let now = Utc::now();
        let s = session(30, now);
        assert_eq!(s.refresh_due_in(now), Duration::ZERO);
        assert!(session(-1, now).is_expired(now));
    }

    #[test]
    fn state_accessors() {
        let now = Utc::now();
        assert!(!AuthState::Unauthenticated.is_authenticated());
        let state = AuthState::Authenticated(session(10, now));
        assert!(state.is_authenticated());
        assert_eq!(state.id_token(), Some("id"));
    }
}
