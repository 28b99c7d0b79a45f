use folio_core::error::CoreError;
use folio_store::StoreError;
use folio_tracker::LookupError;

/// Errors from the mutation layer.
#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    /// The store rejected or failed the request.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A path was malformed or an image could not be encoded.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Form input failed validation; nothing was sent.
    #[error("Invalid input: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// The form's submit control is disabled by a request in flight.
    #[error("A submission is already in progress")]
    InFlight,

    #[error("Payload could not be encoded: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Errors building the application at startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Failed to build IP lookup client: {0}")]
    Lookup(#[from] LookupError),
}
