//! Profile singleton synchronization.
//!
//! Unlike keyed collections, the profile is published as-is: the whole value
//! or nothing.

use std::sync::Arc;

use folio_core::models::Profile;
use folio_core::paths::{self, StorePath};
use folio_store::Subscription;
use serde_json::Value;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Published state of the profile.
#[derive(Debug, Clone)]
pub struct ProfileState {
    pub profile: Option<Arc<Profile>>,
    pub loading: bool,
}

impl Default for ProfileState {
    fn default() -> Self {
        Self {
            profile: None,
            loading: true,
        }
    }
}

/// Sole writer of [`ProfileState`].
pub struct ProfileSync {
    path: StorePath,
    sender: watch::Sender<ProfileState>,
}

impl ProfileSync {
    pub fn new() -> (Self, watch::Receiver<ProfileState>) {
        let (sender, receiver) = watch::channel(ProfileState::default());
        let path = paths::top_level(paths::PROFILE);
        (Self { path, sender }, receiver)
    }

    pub fn path(&self) -> &StorePath {
        &self.path
    }

    pub async fn run(self, mut subscription: Subscription, cancel: CancellationToken) {
        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => break,
                event = subscription.next() => event,
            };

            match event {
                Some(Ok(snapshot)) => self.apply(snapshot.val()),
                Some(Err(e)) => {
                    tracing::error!(path = %self.path, error = %e, "Profile subscription failed");
                    self.publish(None);
                    break;
                }
                None => break,
            }
        }
    }

    pub fn apply(&self, value: Option<&Value>) {
        let profile = match value.cloned().map(serde_json::from_value::<Profile>) {
            Some(Ok(profile)) => Some(Arc::new(profile)),
            Some(Err(e)) => {
                tracing::warn!(path = %self.path, error = %e, "Malformed profile");
                None
            }
            None => {
                tracing::debug!(path = %self.path, "Profile empty");
                None
            }
        };
        self.publish(profile);
    }

    fn publish(&self, profile: Option<Arc<Profile>>) {
        self.sender.send_replace(ProfileState {
            profile,
            loading: false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn publishes_value_as_is() {
        let (sync, rx) = ProfileSync::new();
        sync.apply(Some(&json!({"name": "Ada", "title": "Engineer"})));
        let state = rx.borrow();
        assert!(!state.loading);
        assert_eq!(state.profile.as_ref().unwrap().name, "Ada");
    }

    #[test]
    fn absent_profile_is_none_and_loaded() {
        let (sync, rx) = ProfileSync::new();
        sync.apply(None);
        assert!(rx.borrow().profile.is_none());
        assert!(!rx.borrow().loading);
    }

    #[test]
    fn scalar_profile_is_treated_as_absent() {
        let (sync, rx) = ProfileSync::new();
        sync.apply(Some(&json!("oops")));
        assert!(rx.borrow().profile.is_none());
    }
}
