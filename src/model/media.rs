//! Media payloads exchanged with the generation backend.
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Media type used for background-removed images and remote image output
/// when the service does not name one.
pub const PNG: &str = "image/png";
pub const JPEG: &str = "image/jpeg";
pub const MP4: &str = "video/mp4";

/// Base64 image data plus its media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    pub data: String,
    pub mime_type: String,
}

impl EncodedImage {
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        EncodedImage {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self::new(BASE64.encode(bytes), mime_type)
    }

    pub fn decode(&self) -> AppResult<Vec<u8>> {
        BASE64
            .decode(self.data.as_bytes())
            .map_err(|e| AppError::encoding(format!("invalid base64 payload: {}", e)))
    }

    /// Renderable `data:` URL, the stand-in for a browser preview handle.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Approximate decoded size in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len() / 4 * 3
    }
}

/// One synthesized scene image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub id: String,
    pub image: EncodedImage,
}

impl GeneratedImage {
    /// `index` is the request-issue position inside its batch.
    pub fn new(index: usize, image: EncodedImage) -> Self {
        GeneratedImage {
            id: format!("img-{}-{}", index, Uuid::new_v4().simple()),
            image,
        }
    }
}

/// Structured analysis of a product photo. Every field is required on the
/// wire; a response missing one fails to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    #[serde(rename = "namaProduk")]
    pub name: String,
    #[serde(rename = "deskripsiProduk")]
    pub description: String,
    #[serde(rename = "targetAudience")]
    pub target_audience: String,
}

/// Handle on a long-running video job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoOperation {
    pub name: String,
    pub done: bool,
    pub result_locator: Option<String>,
    pub error: Option<String>,
}

impl VideoOperation {
    pub fn pending(name: impl Into<String>) -> Self {
        VideoOperation {
            name: name.into(),
            done: false,
            result_locator: None,
            error: None,
        }
    }

    /// Locator of a finished job. Fails if the job is still running, ended
    /// with a remote error, or finished without a result.
    pub fn result_locator(&self) -> AppResult<&str> {
        if !self.done {
            return Err(AppError::remote(format!("operation {} is still running", self.name)));
        }
        if let Some(err) = &self.error {
            return Err(AppError::remote(format!("operation {} failed: {}", self.name, err)));
        }
        self.result_locator
            .as_deref()
            .filter(|uri| !uri.is_empty())
            .ok_or_else(|| AppError::MissingResult("Gagal mendapatkan link download video.".to_string()))
    }
}

/// Downloaded video ready for playback or saving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoArtifact {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub source_uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_carries_media_type() {
        let img = EncodedImage::from_bytes(b"abc", PNG);
        assert_eq!(img.data_url(), "data:image/png;base64,YWJj");
        assert_eq!(img.decode().unwrap(), b"abc");
    }

    #[test]
    fn generated_ids_are_unique_and_indexed() {
        let a = GeneratedImage::new(0, EncodedImage::new("x", JPEG));
        let b = GeneratedImage::new(0, EncodedImage::new("x", JPEG));
        assert!(a.id.starts_with("img-0-"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn product_info_requires_every_field() {
        let ok: ProductInfo = serde_json::from_str(
            r#"{"namaProduk":"Kopi","deskripsiProduk":"Enak.","targetAudience":"Mahasiswa"}"#,
        )
        .unwrap();
        assert_eq!(ok.name, "Kopi");

        let missing = serde_json::from_str::<ProductInfo>(r#"{"namaProduk":"Kopi","deskripsiProduk":"Enak."}"#);
        assert!(missing.is_err());
    }

    #[test]
    fn finished_operation_without_locator_is_missing_result() {
        let mut op = VideoOperation::pending("operations/1");
        assert!(matches!(op.result_locator(), Err(AppError::Remote(_))));

        op.done = true;
        assert!(matches!(op.result_locator(), Err(AppError::MissingResult(_))));

        op.result_locator = Some("https://example.test/v.mp4".to_string());
        assert_eq!(op.result_locator().unwrap(), "https://example.test/v.mp4");

        op.error = Some("quota".to_string());
        assert!(matches!(op.result_locator(), Err(AppError::Remote(_))));
    }
}
