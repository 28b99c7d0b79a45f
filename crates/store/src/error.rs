use folio_core::error::CoreError;

/// Errors from a document store adapter.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store's security rules rejected the read or write.
    #[error("Permission denied at '{path}'")]
    PermissionDenied { path: String },

    /// A path or key was malformed.
    #[error(transparent)]
    Path(#[from] CoreError),

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The store returned a non-2xx status code.
    #[error("Store API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A value could not be encoded or a response could not be decoded.
    #[error("Malformed payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// The realtime stream ended or carried an unexpected frame.
    #[error("Stream error: {0}")]
    Stream(String),
}

impl StoreError {
    pub fn permission_denied(path: impl ToString) -> Self {
        StoreError::PermissionDenied {
            path: path.to_string(),
        }
    }

    /// Errors that a reconnect cannot fix.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            StoreError::PermissionDenied { .. } | StoreError::Path(_) | StoreError::Payload(_)
        )
    }
}
