//! Route-change visitor tracking.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use folio_core::models::Analytics;
use folio_core::paths;
use folio_store::{DocumentStore, StoreError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::LookupError;
use crate::lookup::{HttpIpSource, DEFAULT_TIMEOUT, FALLBACK_URL, PRIMARY_URL};
use crate::resolver::IpResolver;

/// Route paths containing this substring are never tracked.
pub const ADMIN_MARKER: &str = "admin";

/// Lookup endpoints and the admin marker.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub primary_url: String,
    pub fallback_url: String,
    pub timeout: Duration,
    pub admin_marker: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            primary_url: PRIMARY_URL.to_string(),
            fallback_url: FALLBACK_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            admin_marker: ADMIN_MARKER.to_string(),
        }
    }
}

/// Records one analytics event per public route change.
///
/// Cheap to clone; clones share the last-seen route.
#[derive(Clone)]
pub struct VisitorTracker {
    store: Arc<dyn DocumentStore>,
    resolver: Arc<IpResolver>,
    admin_marker: Arc<str>,
    last_path: Arc<Mutex<Option<String>>>,
}

impl VisitorTracker {
    pub fn new(store: Arc<dyn DocumentStore>, resolver: IpResolver, admin_marker: &str) -> Self {
        Self {
            store,
            resolver: Arc::new(resolver),
            admin_marker: Arc::from(admin_marker),
            last_path: Arc::default(),
        }
    }

    /// Build a tracker using HTTP lookups per `config`.
    pub fn from_config(
        store: Arc<dyn DocumentStore>,
        config: &TrackerConfig,
    ) -> Result<Self, LookupError> {
        let resolver = IpResolver::new(
            Box::new(HttpIpSource::new(&config.primary_url, config.timeout)?),
            Box::new(HttpIpSource::new(&config.fallback_url, config.timeout)?),
        );
        Ok(Self::new(store, resolver, &config.admin_marker))
    }

    /// Note a route change.
    ///
    /// Returns the spawned recording task, or `None` when the path is
    /// unchanged or belongs to the admin area. The caller is never blocked
    /// and the task is never cancelled.
    pub fn route_changed(&self, path: &str) -> Option<JoinHandle<()>> {
        {
            let mut last = self.last_path.lock().unwrap_or_else(|e| e.into_inner());
            if last.as_deref() == Some(path) {
                return None;
            }
            *last = Some(path.to_string());
        }

        if path.contains(&*self.admin_marker) {
            tracing::debug!(path, "Skipping admin route");
            return None;
        }

        let tracker = self.clone();
        let path = path.to_string();
        Some(tokio::spawn(async move {
            if let Err(e) = tracker.record_visit(&path).await {
                tracing::error!(path = %path, error = %e, "Failed to record visit");
            }
        }))
    }

    /// Resolve the visitor's IP and append the analytics record.
    ///
    /// Returns the new record's key.
    pub async fn record_visit(&self, path: &str) -> Result<String, StoreError> {
        let ip = self.resolver.resolve().await;
        let visit = Analytics::visit(ip, path);
        let key = self
            .store
            .push(&paths::top_level(paths::ANALYTICS), serde_json::to_value(&visit)?)
            .await?;
        tracing::debug!(page = %visit.page, ip = %visit.ip, %key, "Visit recorded");
        Ok(key)
    }

    /// Track every route published on `routes` until `cancel` fires or the
    /// sender is dropped. The current route counts as the first change.
    pub async fn run(self, mut routes: watch::Receiver<String>, cancel: CancellationToken) {
        let current = routes.borrow_and_update().clone();
        self.route_changed(&current);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = routes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let path = routes.borrow_and_update().clone();
                    self.route_changed(&path);
                }
            }
        }
        tracing::debug!("Visitor tracker stopped");
    }
}
