//! In-process document store.
//!
//! [`MemoryStore`] keeps the whole tree in memory and fans every write out
//! to the subscriptions whose path overlaps it, mirroring the hosted store's
//! realtime behaviour closely enough for tests and offline runs. Security
//! rules are approximated by [`deny`](MemoryStore::deny): any read or write
//! at or below a denied path fails with
//! [`StoreError::PermissionDenied`].

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use folio_core::paths::StorePath;
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::push_id::PushIdGenerator;
use crate::subscription::{Subscription, SubscriptionFeed};
use crate::tree;
use crate::DocumentStore;

/// In-memory [`DocumentStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    root: Value,
    watchers: Vec<Watcher>,
    denied: Vec<StorePath>,
    push_ids: PushIdGenerator,
}

struct Watcher {
    feed: SubscriptionFeed,
    /// Last value delivered, so unchanged values are not re-sent.
    last: Option<Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `root`.
    pub fn with_data(root: Value) -> Self {
        let store = Self::default();
        store.lock().root = tree::normalize(root);
        store
    }

    /// Reject every read and write at or below `path`, and end the
    /// subscriptions currently watching it.
    pub fn deny(&self, path: &StorePath) {
        let mut inner = self.lock();
        inner.denied.push(path.clone());
        inner.watchers.retain(|w| {
            if path.is_ancestor_of(w.feed.path()) {
                w.feed
                    .send_error(StoreError::permission_denied(w.feed.path()));
                false
            } else {
                true
            }
        });
    }

    /// Lift every denial.
    pub fn allow_all(&self) {
        self.lock().denied.clear();
    }

    /// Current value at `path`, bypassing security rules.
    pub fn value_at(&self, path: &StorePath) -> Option<Value> {
        tree::get_at(&self.lock().root, path.segments()).cloned()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.lock();
        inner.watchers.retain(|w| !w.feed.is_closed());
        inner.watchers.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock only means a panic elsewhere mid-write; the tree
        // itself is always left consistent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply a write and notify overlapping subscribers.
    fn write(
        &self,
        path: &StorePath,
        apply: impl FnOnce(&mut Inner),
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.check(path)?;
        apply(&mut *inner);
        inner.notify(path);
        Ok(())
    }
}

impl Inner {
    fn check(&self, path: &StorePath) -> Result<(), StoreError> {
        if self.denied.iter().any(|d| d.is_ancestor_of(path)) {
            return Err(StoreError::permission_denied(path));
        }
        Ok(())
    }

    fn notify(&mut self, written: &StorePath) {
        let root = &self.root;
        self.watchers.retain_mut(|w| {
            if w.feed.is_closed() {
                return false;
            }
            if !w.feed.path().overlaps(written) {
                return true;
            }
            let current = tree::get_at(root, w.feed.path().segments()).cloned();
            if current == w.last {
                return true;
            }
            w.last = current.clone();
            w.feed.send_value(current)
        });
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn subscribe(&self, path: &StorePath) -> Subscription {
        let (feed, subscription) = Subscription::channel(path.clone());
        let mut inner = self.lock();

        if let Err(e) = inner.check(path) {
            feed.send_error(e);
            return subscription;
        }

        let current = tree::get_at(&inner.root, path.segments()).cloned();
        feed.send_value(current.clone());
        inner.watchers.push(Watcher {
            feed,
            last: current,
        });
        subscription
    }

    async fn get(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
        let inner = self.lock();
        inner.check(path)?;
        Ok(tree::get_at(&inner.root, path.segments()).cloned())
    }

    async fn set(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        self.write(path, |inner| tree::set_at(&mut inner.root, path.segments(), value))
    }

    async fn push(&self, path: &StorePath, value: Value) -> Result<String, StoreError> {
        let mut inner = self.lock();
        let key = inner.push_ids.next_id();
        let target = path.child(&key)?;
        inner.check(&target)?;
        tree::set_at(&mut inner.root, target.segments(), value);
        inner.notify(&target);
        Ok(key)
    }

    async fn update(&self, path: &StorePath, fields: Map<String, Value>) -> Result<(), StoreError> {
        for key in fields.keys() {
            StorePath::parse(key)?;
        }
        self.write(path, |inner| {
            tree::update_at(&mut inner.root, path.segments(), fields)
        })
    }

    async fn remove(&self, path: &StorePath) -> Result<(), StoreError> {
        self.write(path, |inner| {
            tree::set_at(&mut inner.root, path.segments(), Value::Null)
        })
    }
}
