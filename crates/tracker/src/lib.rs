//! Best-effort visitor analytics.
//!
//! On every public route change the [`VisitorTracker`] resolves the
//! visitor's public IP through a primary and a fallback lookup service and
//! appends an analytics record. Nothing here ever fails the caller: lookup
//! failures degrade to a sentinel address and write failures are logged.

pub mod error;
pub mod lookup;
pub mod resolver;
pub mod tracker;

pub use error::LookupError;
pub use lookup::{HttpIpSource, IpSource};
pub use resolver::{IpResolver, PRIVATE_IP};
pub use tracker::{TrackerConfig, VisitorTracker};
