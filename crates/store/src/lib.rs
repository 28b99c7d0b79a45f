//! Document store access.
//!
//! The [`DocumentStore`] trait is the seam every other crate talks to: a
//! hierarchical JSON tree addressed by slash-separated paths, with realtime
//! subscriptions and five write operations. Two adapters implement it:
//!
//! - [`MemoryStore`]: the whole tree in process, for tests and offline runs.
//! - [`RestStore`]: the hosted realtime database over its REST and
//!   event-stream protocol.

pub mod error;
pub mod memory;
pub mod push_id;
pub mod rest;
pub mod subscription;
pub mod tree;

use async_trait::async_trait;
use folio_core::paths::StorePath;
use serde_json::{Map, Value};

pub use error::StoreError;
pub use memory::MemoryStore;
pub use rest::RestStore;
pub use subscription::{Snapshot, Subscription, SubscriptionEvent, SubscriptionFeed};

/// A hierarchical, realtime JSON document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Start watching `path`.
    ///
    /// The subscription first delivers the current value, then a new
    /// snapshot on every change, until it is dropped or an error ends it.
    fn subscribe(&self, path: &StorePath) -> Subscription;

    /// One-off read of the value at `path`.
    async fn get(&self, path: &StorePath) -> Result<Option<Value>, StoreError>;

    /// Replace the value at `path`. Writing `null` removes it.
    async fn set(&self, path: &StorePath, value: Value) -> Result<(), StoreError>;

    /// Append `value` under a new store-assigned key and return the key.
    async fn push(&self, path: &StorePath, value: Value) -> Result<String, StoreError>;

    /// Merge `fields` into the object at `path`, leaving other children
    /// untouched.
    async fn update(&self, path: &StorePath, fields: Map<String, Value>)
        -> Result<(), StoreError>;

    /// Remove the value at `path`. Removing a missing path succeeds.
    async fn remove(&self, path: &StorePath) -> Result<(), StoreError>;
}
