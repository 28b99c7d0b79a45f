#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid store path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
