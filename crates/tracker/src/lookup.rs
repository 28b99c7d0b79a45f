//! Public IP lookup services.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::LookupError;

/// Primary lookup service; answers `{"ip": "..."}`.
pub const PRIMARY_URL: &str = "https://api.ipify.org?format=json";

/// Fallback lookup service; answers `{"ip": "...", ...}`.
pub const FALLBACK_URL: &str = "https://ipapi.co/json/";

/// Per-request timeout applied to each lookup.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Something that can tell the visitor's public IP.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    async fn lookup(&self) -> Result<String, LookupError>;
}

#[derive(Debug, Deserialize)]
struct IpResponse {
    #[serde(default)]
    ip: Option<String>,
}

/// [`IpSource`] calling a JSON lookup service over HTTP.
pub struct HttpIpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpIpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, url))
    }

    /// Create a source reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl IpSource for HttpIpSource {
    fn name(&self) -> &str {
        &self.url
    }

    async fn lookup(&self) -> Result<String, LookupError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
            });
        }

        let body: IpResponse = response.json().await?;
        body.ip
            .map(|ip| ip.trim().to_string())
            .filter(|ip| !ip.is_empty())
            .ok_or(LookupError::MissingIp)
    }
}
