//! Realtime subscriptions.
//!
//! A [`Subscription`] is the consumer end of a per-path channel: the store
//! adapter holds the matching [`SubscriptionFeed`] and pushes a
//! [`Snapshot`] every time the value at the path changes. Dropping the
//! subscription cancels it; the adapter notices through the feed and stops
//! delivering.

use folio_core::paths::StorePath;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::StoreError;

/// A point-in-time value at a subscribed path.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub path: StorePath,
    /// `None` when nothing is stored at the path.
    pub value: Option<Value>,
}

impl Snapshot {
    pub fn new(path: StorePath, value: Option<Value>) -> Self {
        let value = value.filter(|v| !v.is_null());
        Self { path, value }
    }

    pub fn exists(&self) -> bool {
        self.value.is_some()
    }

    pub fn val(&self) -> Option<&Value> {
        self.value.as_ref()
    }
}

/// What a subscription delivers: a snapshot, or the error that ended it.
pub type SubscriptionEvent = Result<Snapshot, StoreError>;

/// Consumer end of a realtime subscription.
pub struct Subscription {
    path: StorePath,
    receiver: mpsc::UnboundedReceiver<SubscriptionEvent>,
    cancel: CancellationToken,
}

/// Producer end of a realtime subscription, held by the store adapter.
#[derive(Clone)]
pub struct SubscriptionFeed {
    path: StorePath,
    sender: mpsc::UnboundedSender<SubscriptionEvent>,
    cancel: CancellationToken,
}

impl Subscription {
    /// Create a connected feed/subscription pair for `path`.
    pub fn channel(path: StorePath) -> (SubscriptionFeed, Subscription) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        (
            SubscriptionFeed {
                path: path.clone(),
                sender,
                cancel: cancel.clone(),
            },
            Subscription {
                path,
                receiver,
                cancel,
            },
        )
    }

    pub fn path(&self) -> &StorePath {
        &self.path
    }

    /// Wait for the next snapshot or error.
    ///
    /// Returns `None` once the adapter has stopped delivering.
    pub async fn next(&mut self) -> Option<SubscriptionEvent> {
        self.receiver.recv().await
    }

    /// Stop the subscription. Equivalent to dropping it.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl SubscriptionFeed {
    pub fn path(&self) -> &StorePath {
        &self.path
    }

    /// Deliver the current value. Returns `false` once the subscriber is
    /// gone.
    pub fn send_value(&self, value: Option<Value>) -> bool {
        self.send(Ok(Snapshot::new(self.path.clone(), value)))
    }

    /// Deliver the error that ends this subscription.
    pub fn send_error(&self, error: StoreError) -> bool {
        self.send(Err(error))
    }

    /// True once the subscriber has unsubscribed or been dropped.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled() || self.sender.is_closed()
    }

    /// Resolves when the subscriber unsubscribes.
    pub async fn closed(&self) {
        self.cancel.cancelled().await;
    }

    fn send(&self, event: SubscriptionEvent) -> bool {
        !self.is_closed() && self.sender.send(event).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn values_arrive_in_order() {
        let (feed, mut sub) = Subscription::channel(StorePath::parse("skills").unwrap());
        assert!(feed.send_value(Some(json!({"a": 1}))));
        assert!(feed.send_value(None));

        let first = sub.next().await.unwrap().unwrap();
        assert_eq!(first.val(), Some(&json!({"a": 1})));
        let second = sub.next().await.unwrap().unwrap();
        assert!(!second.exists());
    }

    #[test]
    fn null_values_are_absent() {
        let snap = Snapshot::new(StorePath::root(), Some(Value::Null));
        assert!(!snap.exists());
    }

    #[tokio::test]
    async fn dropping_the_subscription_closes_the_feed() {
        let (feed, sub) = Subscription::channel(StorePath::root());
        assert!(!feed.is_closed());
        sub.unsubscribe();
        assert!(feed.is_closed());
        assert!(!feed.send_value(None));
        feed.closed().await;
    }

    #[tokio::test]
    async fn dropping_the_feed_ends_the_subscription() {
        let (feed, mut sub) = Subscription::channel(StorePath::root());
        drop(feed);
        assert!(sub.next().await.is_none());
    }
}
