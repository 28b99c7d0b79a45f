use std::time::Duration;

use folio_tracker::lookup::{FALLBACK_URL, PRIMARY_URL};
use folio_tracker::tracker::ADMIN_MARKER;
use folio_tracker::TrackerConfig;

/// Application configuration loaded from environment variables.
///
/// Everything is optional: without a database URL the in-memory store is
/// used, and without an API key the in-memory identity provider.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Realtime database base URL.
    pub database_url: Option<String>,
    /// Web API key of the identity project.
    pub api_key: Option<String>,
    /// Visitor tracker lookups and admin route marker.
    pub tracker: TrackerConfig,
    /// Admin credentials to sign in with at startup.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                             |
    /// |--------------------------|-------------------------------------|
    /// | `FIREBASE_DATABASE_URL`  | unset (in-memory store)             |
    /// | `FIREBASE_API_KEY`       | unset (in-memory identity)          |
    /// | `IP_LOOKUP_PRIMARY_URL`  | `https://api.ipify.org?format=json` |
    /// | `IP_LOOKUP_FALLBACK_URL` | `https://ipapi.co/json/`            |
    /// | `IP_LOOKUP_TIMEOUT_SECS` | `5`                                 |
    /// | `ADMIN_ROUTE_MARKER`     | `admin`                             |
    /// | `FOLIO_ADMIN_EMAIL`      | unset                               |
    /// | `FOLIO_ADMIN_PASSWORD`   | unset                               |
    pub fn from_env() -> Self {
        let timeout_secs: u64 = std::env::var("IP_LOOKUP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("IP_LOOKUP_TIMEOUT_SECS must be a valid u64");

        let tracker = TrackerConfig {
            primary_url: std::env::var("IP_LOOKUP_PRIMARY_URL")
                .unwrap_or_else(|_| PRIMARY_URL.into()),
            fallback_url: std::env::var("IP_LOOKUP_FALLBACK_URL")
                .unwrap_or_else(|_| FALLBACK_URL.into()),
            timeout: Duration::from_secs(timeout_secs),
            admin_marker: std::env::var("ADMIN_ROUTE_MARKER")
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| ADMIN_MARKER.into()),
        };

        Self {
            database_url: non_empty_var("FIREBASE_DATABASE_URL"),
            api_key: non_empty_var("FIREBASE_API_KEY"),
            tracker,
            admin_email: non_empty_var("FOLIO_ADMIN_EMAIL"),
            admin_password: non_empty_var("FOLIO_ADMIN_PASSWORD"),
        }
    }

    /// Startup credentials, when both halves are configured.
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        Some((self.admin_email.as_deref()?, self.admin_password.as_deref()?))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
