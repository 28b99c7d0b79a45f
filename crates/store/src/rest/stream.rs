//! Realtime event-stream decoding.
//!
//! The database streams changes as server-sent events:
//!
//! ```text
//! event: put
//! data: {"path":"/","data":{"-Nabc":{"name":"SEO"}}}
//!
//! event: patch
//! data: {"path":"/-Nabc","data":{"name":"SEO Audit"}}
//!
//! event: keep-alive
//! data: null
//! ```
//!
//! [`SseDecoder`] turns the raw byte stream into frames, [`StreamEvent`]
//! gives them meaning, and [`StreamState`] folds them into the current value
//! at the subscribed path.

use folio_core::paths::StorePath;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::tree;

/// One `event:`/`data:` frame, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub event: String,
    pub data: String,
}

/// Incremental server-sent-events decoder.
///
/// Bytes may arrive split at any point, including inside a UTF-8 sequence;
/// only complete lines are decoded.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: String,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every frame it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<RawEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(end) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=end).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if let Some(event) = self.dispatch() {
                    events.push(event);
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };
            match field {
                "event" => self.event = value.to_string(),
                "data" => self.data.push(value.to_string()),
                _ => {}
            }
        }
        events
    }

    fn dispatch(&mut self) -> Option<RawEvent> {
        let event = std::mem::take(&mut self.event);
        let data = std::mem::take(&mut self.data);
        if event.is_empty() && data.is_empty() {
            return None;
        }
        Some(RawEvent {
            event,
            data: data.join("\n"),
        })
    }
}

/// A decoded stream event.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Replace the value at `path`, relative to the subscribed path.
    Put { path: StorePath, data: Value },
    /// Merge children into the value at `path`.
    Patch {
        path: StorePath,
        data: Map<String, Value>,
    },
    KeepAlive,
    /// The security rules no longer allow reading the path.
    Cancel(String),
    /// The auth token expired or was revoked.
    AuthRevoked(String),
}

#[derive(Deserialize)]
struct Change {
    path: String,
    data: Value,
}

impl StreamEvent {
    /// Interpret a raw frame. Unknown event names yield `Ok(None)`.
    pub fn parse(raw: &RawEvent) -> Result<Option<Self>, StoreError> {
        let event = match raw.event.as_str() {
            "put" => {
                let change: Change = serde_json::from_str(&raw.data)?;
                StreamEvent::Put {
                    path: StorePath::parse(&change.path)?,
                    data: change.data,
                }
            }
            "patch" => {
                let change: Change = serde_json::from_str(&raw.data)?;
                let Value::Object(data) = change.data else {
                    return Err(StoreError::Stream(format!(
                        "patch at '{}' carried a non-object payload",
                        change.path
                    )));
                };
                StreamEvent::Patch {
                    path: StorePath::parse(&change.path)?,
                    data,
                }
            }
            "keep-alive" => StreamEvent::KeepAlive,
            "cancel" => StreamEvent::Cancel(reason(&raw.data)),
            "auth_revoked" => StreamEvent::AuthRevoked(reason(&raw.data)),
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}

/// Cancel reasons arrive as a JSON string, or `null`.
fn reason(data: &str) -> String {
    match serde_json::from_str::<Value>(data) {
        Ok(Value::String(s)) => s,
        _ => data.to_string(),
    }
}

/// The value at the subscribed path, rebuilt from stream events.
#[derive(Debug, Default)]
pub struct StreamState {
    value: Value,
    received: bool,
}

impl StreamState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold `event` in. Returns `true` when the value should be published:
    /// on the first `put`, and on any later change.
    pub fn apply(&mut self, event: StreamEvent) -> bool {
        let before = self.value.clone();
        match event {
            StreamEvent::Put { path, data } => {
                tree::set_at(&mut self.value, path.segments(), data);
            }
            StreamEvent::Patch { path, data } => {
                tree::update_at(&mut self.value, path.segments(), data);
            }
            _ => return false,
        }
        let first = !self.received;
        self.received = true;
        first || self.value != before
    }

    pub fn value(&self) -> Option<&Value> {
        if self.value.is_null() {
            None
        } else {
            Some(&self.value)
        }
    }
}
