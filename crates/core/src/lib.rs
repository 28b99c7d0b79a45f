//! Folio domain types.
//!
//! Entity models for every collection in the document store, the store
//! paths they live at, tolerant decoding at the synchronization boundary,
//! and the small pieces of derived state the console shows (inbox, traffic
//! summary).

pub mod assets;
pub mod error;
pub mod lenient;
pub mod models;
pub mod paths;
pub mod rating;
pub mod types;
