//! Inline image encoding.
//!
//! Images are not uploaded to blob storage; they are stored inline as
//! `data:` URLs in the record's `image` / `profilePic` field.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::ImageFormat;

use crate::error::CoreError;

/// Formats accepted for inline storage.
const ACCEPTED: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::WebP,
    ImageFormat::Gif,
];

/// Encode raw image bytes as a `data:<mime>;base64,<payload>` URL.
///
/// The format is sniffed from the bytes, not taken from a file name.
pub fn encode_data_url(bytes: &[u8]) -> Result<String, CoreError> {
    let format = image::guess_format(bytes)
        .map_err(|e| CoreError::UnsupportedImage(e.to_string()))?;

    if !ACCEPTED.contains(&format) {
        return Err(CoreError::UnsupportedImage(format!("{format:?}")));
    }

    Ok(format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        STANDARD.encode(bytes)
    ))
}

/// Read a local image file and encode it as a data URL.
pub async fn encode_image_file(path: impl AsRef<Path>) -> Result<String, CoreError> {
    let bytes = tokio::fs::read(path).await?;
    encode_data_url(&bytes)
}

/// True when `value` is an inline data URL rather than a remote link.
pub fn is_data_url(value: &str) -> bool {
    value.starts_with("data:")
}
