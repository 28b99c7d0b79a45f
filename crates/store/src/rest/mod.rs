//! Hosted realtime database adapter.

pub mod client;
pub mod reconnect;
pub mod stream;

pub use client::RestStore;
pub use reconnect::ReconnectConfig;
