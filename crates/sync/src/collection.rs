//! Keyed-collection synchronization.

use std::sync::Arc;

use folio_core::models::keyed::materialize;
use folio_core::paths::StorePath;
use folio_store::Subscription;
use serde_json::Value;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Published state of one collection.
#[derive(Debug)]
pub struct CollectionState<T> {
    /// Entities in store key order, each with its key as `id`.
    pub items: Arc<Vec<T>>,
    /// `true` until the first snapshot or error arrives; never set back.
    pub loading: bool,
}

impl<T> Clone for CollectionState<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            loading: self.loading,
        }
    }
}

impl<T> Default for CollectionState<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            loading: true,
        }
    }
}

impl<T> CollectionState<T> {
    pub fn is_loaded(&self) -> bool {
        !self.loading
    }
}

/// Sole writer of one collection's [`CollectionState`].
pub struct CollectionSync<T> {
    path: StorePath,
    sender: watch::Sender<CollectionState<T>>,
}

impl<T> CollectionSync<T>
where
    T: serde::de::DeserializeOwned + Send + Sync + 'static,
{
    /// Create the writer for `path` and the first receiver of its state.
    pub fn new(path: StorePath) -> (Self, watch::Receiver<CollectionState<T>>) {
        let (sender, receiver) = watch::channel(CollectionState::default());
        (Self { path, sender }, receiver)
    }

    pub fn path(&self) -> &StorePath {
        &self.path
    }

    /// Consume snapshots from `subscription` until it ends, fails, or
    /// `cancel` fires.
    ///
    /// A subscription error publishes an empty list and stops; reconnecting
    /// is the store adapter's job, not this loop's.
    pub async fn run(self, mut subscription: Subscription, cancel: CancellationToken) {
        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(path = %self.path, "Collection sync cancelled");
                    break;
                }
                event = subscription.next() => event,
            };

            match event {
                Some(Ok(snapshot)) => self.apply(snapshot.val()),
                Some(Err(e)) => {
                    tracing::error!(path = %self.path, error = %e, "Collection subscription failed");
                    self.publish(Vec::new());
                    break;
                }
                None => {
                    tracing::debug!(path = %self.path, "Collection subscription closed");
                    self.sender.send_if_modified(|state| {
                        let was_loading = state.loading;
                        state.loading = false;
                        was_loading
                    });
                    break;
                }
            }
        }
    }

    /// Materialize one snapshot value and publish it.
    pub fn apply(&self, value: Option<&Value>) {
        let materialized = materialize::<T>(value);
        if !materialized.skipped.is_empty() {
            tracing::warn!(
                path = %self.path,
                skipped = ?materialized.skipped,
                "Skipped malformed entries",
            );
        }

        if materialized.items.is_empty() {
            tracing::debug!(path = %self.path, "Collection empty");
        } else {
            tracing::debug!(path = %self.path, count = materialized.items.len(), "Collection loaded");
        }
        self.publish(materialized.items);
    }

    fn publish(&self, items: Vec<T>) {
        self.sender.send_replace(CollectionState {
            items: Arc::new(items),
            loading: false,
        });
    }
}
