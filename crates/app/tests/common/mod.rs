//! Shared fixtures for application tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use folio_app::{Mutations, Notice, Notifier};
use folio_core::paths::StorePath;
use folio_store::{DocumentStore, MemoryStore, StoreError, Subscription};
use folio_tracker::{IpResolver, IpSource, LookupError};
use serde_json::{Map, Value};
use tokio::sync::mpsc;

pub fn path(p: &str) -> StorePath {
    StorePath::parse(p).unwrap()
}

/// [`MemoryStore`] that counts the write requests it receives.
pub struct CountingStore {
    pub inner: MemoryStore,
    writes: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: MemoryStore) -> Arc<Self> {
        Arc::new(Self {
            inner,
            writes: AtomicUsize::new(0),
        })
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for CountingStore {
    fn subscribe(&self, path: &StorePath) -> Subscription {
        self.inner.subscribe(path)
    }

    async fn get(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
        self.inner.get(path).await
    }

    async fn set(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        self.count();
        self.inner.set(path, value).await
    }

    async fn push(&self, path: &StorePath, value: Value) -> Result<String, StoreError> {
        self.count();
        self.inner.push(path, value).await
    }

    async fn update(
        &self,
        path: &StorePath,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        self.count();
        self.inner.update(path, fields).await
    }

    async fn remove(&self, path: &StorePath) -> Result<(), StoreError> {
        self.count();
        self.inner.remove(path).await
    }
}

/// Mutations over a counting store, plus the notices they emit.
pub struct Harness {
    pub store: Arc<CountingStore>,
    pub mutations: Mutations,
    pub notices: mpsc::UnboundedReceiver<Notice>,
}

impl Harness {
    pub fn new(data: Value) -> Self {
        let store = CountingStore::new(MemoryStore::with_data(data));
        let (notifier, notices) = Notifier::channel();
        let mutations = Mutations::new(store.clone(), notifier);
        Self {
            store,
            mutations,
            notices,
        }
    }

    pub fn empty() -> Self {
        Self::new(Value::Null)
    }

    pub fn value_at(&self, p: &str) -> Option<Value> {
        self.store.inner.value_at(&path(p))
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        let mut taken = Vec::new();
        while let Ok(notice) = self.notices.try_recv() {
            taken.push(notice);
        }
        taken
    }
}

/// [`IpSource`] with a fixed answer.
pub struct FixedIp(pub Option<&'static str>);

#[async_trait]
impl IpSource for FixedIp {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn lookup(&self) -> Result<String, LookupError> {
        self.0
            .map(str::to_string)
            .ok_or(LookupError::MissingIp)
    }
}

pub fn resolver(ip: Option<&'static str>) -> IpResolver {
    IpResolver::new(Box::new(FixedIp(ip)), Box::new(FixedIp(None)))
}
