//! Realtime synchronization of store collections into application state.
//!
//! Each collection path gets one long-lived subscription whose snapshots are
//! materialized into a list of entities and published on a
//! `tokio::sync::watch` channel. The sync task is the only writer; views
//! hold receivers. [`SyncedState`] starts one task per collection plus one
//! for the profile singleton and owns their shared cancellation.

pub mod collection;
pub mod profile;
pub mod state;

pub use collection::{CollectionState, CollectionSync};
pub use profile::{ProfileState, ProfileSync};
pub use state::{StateView, SyncedState};
