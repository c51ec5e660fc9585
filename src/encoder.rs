//! Turns a user-supplied image into a base64 payload plus media type.
//!
//! The declared media type wins when it names an image; otherwise the bytes
//! are sniffed, and the file extension is the last resort.
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::model::EncodedImage;

/// Where a user-chosen image comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    File(PathBuf),
    Bytes {
        bytes: Vec<u8>,
        content_type: Option<String>,
    },
}

impl ImageSource {
    pub async fn encode(&self) -> AppResult<EncodedImage> {
        match self {
            ImageSource::File(path) => encode_file(path).await,
            ImageSource::Bytes { bytes, content_type } => encode_bytes(bytes, content_type.as_deref()),
        }
    }
}

/// Read and encode an image file.
pub async fn encode_file(path: impl AsRef<Path>) -> AppResult<EncodedImage> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::encoding(format!("cannot read {}: {}", path.display(), e)))?;
    let from_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(mime_for_extension);
    tracing::debug!("Encoding {} ({} bytes)", path.display(), bytes.len());
    encode_with(&bytes, None, from_extension)
}

/// Encode raw bytes, e.g. an uploaded request body.
pub fn encode_bytes(bytes: &[u8], declared: Option<&str>) -> AppResult<EncodedImage> {
    encode_with(bytes, declared, None)
}

fn encode_with(
    bytes: &[u8],
    declared: Option<&str>,
    from_extension: Option<&'static str>,
) -> AppResult<EncodedImage> {
    if bytes.is_empty() {
        return Err(AppError::encoding("image is empty"));
    }
    let mime_type = declared
        .map(|m| m.split(';').next().unwrap_or(m).trim())
        .filter(|m| m.starts_with("image/"))
        .map(str::to_string)
        .or_else(|| sniff(bytes).or(from_extension).map(str::to_string))
        .ok_or_else(|| AppError::encoding("resource is not a recognised image"))?;
    Ok(EncodedImage::from_bytes(bytes, mime_type))
}

fn sniff(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF8") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}
