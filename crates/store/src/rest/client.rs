//! REST client for the hosted realtime database.
//!
//! Every path maps to `{database_url}/{path}.json`. Writes use `PUT`,
//! `POST`, `PATCH` and `DELETE`; subscriptions hold a `GET` open with
//! `Accept: text/event-stream` and fold the streamed changes into full
//! snapshots. When signed in, the current ID token is sent as the `auth`
//! query parameter so the database's security rules see the admin.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use folio_core::paths::StorePath;
use futures::StreamExt;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::rest::reconnect::{next_delay, ReconnectConfig};
use crate::rest::stream::{SseDecoder, StreamEvent, StreamState};
use crate::subscription::{Subscription, SubscriptionFeed};
use crate::DocumentStore;

/// [`DocumentStore`] backed by the database's REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and auth token.
#[derive(Clone)]
pub struct RestStore {
    inner: Arc<Inner>,
}

struct Inner {
    client: reqwest::Client,
    database_url: String,
    token: RwLock<Option<String>>,
    reconnect: ReconnectConfig,
}

/// Response to a `POST`: the key the database assigned.
#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

impl RestStore {
    /// Create a store for a database, e.g.
    /// `https://my-portfolio-default-rtdb.firebaseio.com`.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), database_url)
    }

    /// Create a store reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, database_url: impl Into<String>) -> Self {
        let database_url = database_url.into().trim_end_matches('/').to_string();
        Self {
            inner: Arc::new(Inner {
                client,
                database_url,
                token: RwLock::new(None),
                reconnect: ReconnectConfig::default(),
            }),
        }
    }

    /// Override the stream reconnect backoff.
    pub fn with_reconnect(self, reconnect: ReconnectConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                client: self.inner.client.clone(),
                database_url: self.inner.database_url.clone(),
                token: RwLock::new(self.inner.current_token()),
                reconnect,
            }),
        }
    }

    /// Set or clear the ID token attached to every later request.
    ///
    /// Open subscriptions pick up the new token when they next reconnect.
    pub fn set_auth_token(&self, token: Option<String>) {
        let mut slot = self.inner.token.write().unwrap_or_else(|e| e.into_inner());
        *slot = token;
    }

    pub fn database_url(&self) -> &str {
        &self.inner.database_url
    }
}

impl Inner {
    fn current_token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn url(&self, path: &StorePath) -> String {
        format!("{}/{}.json", self.database_url, path)
    }

    fn request(&self, method: Method, path: &StorePath) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.current_token() {
            Some(token) => builder.query(&[("auth", token)]),
            None => builder,
        }
    }

    /// Hold the event stream for one connection. Returns `Ok` when the
    /// server closes the stream or the subscriber goes away.
    async fn stream_once(&self, feed: &SubscriptionFeed) -> Result<(), StoreError> {
        let response = self
            .request(Method::GET, feed.path())
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;
        let response = ensure_success(feed.path(), response).await?;

        tracing::debug!(path = %feed.path(), "Realtime stream connected");

        let mut decoder = SseDecoder::new();
        let mut state = StreamState::new();
        let mut body = response.bytes_stream();

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            for raw in decoder.push(&chunk) {
                let Some(event) = StreamEvent::parse(&raw)? else {
                    tracing::debug!(event = %raw.event, "Ignoring unknown stream event");
                    continue;
                };
                match event {
                    StreamEvent::Cancel(reason) | StreamEvent::AuthRevoked(reason) => {
                        tracing::warn!(path = %feed.path(), %reason, "Realtime stream cancelled");
                        return Err(StoreError::permission_denied(feed.path()));
                    }
                    StreamEvent::KeepAlive => {}
                    change => {
                        if state.apply(change) && !feed.send_value(state.value().cloned()) {
                            return Ok(());
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Keep a subscription fed until it is dropped or fails for good.
async fn run_stream(inner: Arc<Inner>, feed: SubscriptionFeed) {
    let mut delay = inner.reconnect.initial_delay;

    loop {
        let outcome = tokio::select! {
            _ = feed.closed() => return,
            outcome = inner.stream_once(&feed) => outcome,
        };

        match outcome {
            Ok(()) if feed.is_closed() => return,
            Ok(()) => {
                tracing::info!(path = %feed.path(), "Realtime stream closed by server");
                delay = inner.reconnect.initial_delay;
            }
            Err(e) if e.is_fatal() => {
                tracing::error!(path = %feed.path(), error = %e, "Realtime subscription failed");
                feed.send_error(e);
                return;
            }
            Err(e) => {
                tracing::warn!(
                    path = %feed.path(),
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "Realtime stream dropped, reconnecting",
                );
            }
        }

        tokio::select! {
            _ = feed.closed() => return,
            _ = tokio::time::sleep(delay) => {}
        }
        delay = next_delay(delay, &inner.reconnect);
    }
}

#[async_trait]
impl DocumentStore for RestStore {
    fn subscribe(&self, path: &StorePath) -> Subscription {
        let (feed, subscription) = Subscription::channel(path.clone());
        tokio::spawn(run_stream(Arc::clone(&self.inner), feed));
        subscription
    }

    async fn get(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
        let response = self.inner.request(Method::GET, path).send().await?;
        let value: Value = parse_response(path, response).await?;
        Ok(Some(value).filter(|v| !v.is_null()))
    }

    async fn set(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        let response = self
            .inner
            .request(Method::PUT, path)
            .json(&value)
            .send()
            .await?;
        check_status(path, response).await
    }

    async fn push(&self, path: &StorePath, value: Value) -> Result<String, StoreError> {
        let response = self
            .inner
            .request(Method::POST, path)
            .json(&value)
            .send()
            .await?;
        let pushed: PushResponse = parse_response(path, response).await?;
        Ok(pushed.name)
    }

    async fn update(&self, path: &StorePath, fields: Map<String, Value>) -> Result<(), StoreError> {
        for key in fields.keys() {
            StorePath::parse(key)?;
        }
        let response = self
            .inner
            .request(Method::PATCH, path)
            .json(&fields)
            .send()
            .await?;
        check_status(path, response).await
    }

    async fn remove(&self, path: &StorePath) -> Result<(), StoreError> {
        let response = self.inner.request(Method::DELETE, path).send().await?;
        check_status(path, response).await
    }
}

// ---- response helpers ----

/// Pass successful responses through; map rule rejections to
/// [`StoreError::PermissionDenied`] and anything else to
/// [`StoreError::Api`].
async fn ensure_success(
    path: &StorePath,
    response: reqwest::Response,
) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(StoreError::permission_denied(path));
    }
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(StoreError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    path: &StorePath,
    response: reqwest::Response,
) -> Result<T, StoreError> {
    let response = ensure_success(path, response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn check_status(path: &StorePath, response: reqwest::Response) -> Result<(), StoreError> {
    ensure_success(path, response).await?;
    Ok(())
}
