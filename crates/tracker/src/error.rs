/// Why a single IP lookup failed.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The lookup service returned a non-2xx status code.
    #[error("Lookup service returned status {status}")]
    Status { status: u16 },

    /// The response decoded but carried no usable `ip` field.
    #[error("Lookup response has no ip")]
    MissingIp,
}
