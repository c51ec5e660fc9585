//! Request and response bodies of the Gemini REST API (`v1beta`).
//!
//! Only the fields this crate reads or writes are modelled; unknown fields
//! in responses are ignored.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{EncodedImage, VideoOperation};

pub const MODALITY_IMAGE: &str = "IMAGE";
pub const MODALITY_TEXT: &str = "TEXT";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    pub fn new(parts: Vec<Part>) -> Self {
        GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: None,
        }
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "inline_data")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn image(image: &EncodedImage) -> Self {
        Part {
            text: None,
            inline_data: Some(InlineData {
                mime_type: image.mime_type.clone(),
                data: image.data.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(alias = "mime_type")]
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
}

impl GenerationConfig {
    pub fn json(schema: Value) -> Self {
        GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema),
            response_modalities: None,
        }
    }

    pub fn image_and_text() -> Self {
        GenerationConfig {
            response_modalities: Some(vec![MODALITY_IMAGE.to_string(), MODALITY_TEXT.to_string()]),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[])
    }

    /// Concatenated text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .first_parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// First inline image of the first candidate.
    pub fn first_image(&self) -> Option<EncodedImage> {
        self.first_parts()
            .iter()
            .filter_map(|p| p.inline_data.as_ref())
            .find(|d| !d.data.is_empty())
            .map(|d| EncodedImage::new(d.data.clone(), d.mime_type.clone()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictRequest<I, P> {
    pub instances: Vec<I>,
    pub parameters: P,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImagenInstance {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagenParameters {
    pub sample_count: u32,
    pub aspect_ratio: String,
    pub output_options: OutputOptions,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputOptions {
    pub mime_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    #[serde(default)]
    pub bytes_base64_encoded: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoInstance {
    pub prompt: String,
    pub image: SeedFrame,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedFrame {
    pub bytes_base64_encoded: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoParameters {
    pub sample_count: u32,
    pub aspect_ratio: String,
}

/// Long-running operation as returned by `predictLongRunning` and by
/// `GET {operation name}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationResponse {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub response: Option<OperationResult>,
    #[serde(default)]
    pub error: Option<OperationError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    #[serde(default)]
    pub generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedSample {
    #[serde(default)]
    pub video: Option<VideoRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoRef {
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
}

impl From<OperationResponse> for VideoOperation {
    fn from(op: OperationResponse) -> Self {
        let result_locator = op
            .response
            .and_then(|r| r.generate_video_response)
            .and_then(|r| r.generated_samples.into_iter().next())
            .and_then(|s| s.video)
            .and_then(|v| v.uri);
        let error = op.error.map(|e| match e.code {
            Some(code) => format!("{} (code {})", e.message, code),
            None => e.message,
        });
        VideoOperation {
            name: op.name,
            done: op.done,
            result_locator,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_uses_camel_case_and_skips_empty_fields() {
        let req = GenerateContentRequest::new(vec![
            Part::image(&EncodedImage::new("AAAA", "image/png")),
            Part::text("hello"),
        ])
        .with_config(GenerationConfig::image_and_text());

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{"parts": [
                    {"inlineData": {"mimeType": "image/png", "data": "AAAA"}},
                    {"text": "hello"}
                ]}],
                "generationConfig": {"responseModalities": ["IMAGE", "TEXT"]}
            })
        );
    }

    #[test]
    fn response_helpers_pick_first_candidate() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [
                {"text": "here you go"},
                {"inline_data": {"mime_type": "image/png", "data": "QUJD"}}
            ]}}]
        }))
        .unwrap();
        assert_eq!(resp.text().as_deref(), Some("here you go"));
        assert_eq!(resp.first_image(), Some(EncodedImage::new("QUJD", "image/png")));

        let empty: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(empty.text().is_none());
        assert!(empty.first_image().is_none());
    }

    #[test]
    fn operation_maps_to_video_operation() {
        let op: OperationResponse = serde_json::from_value(json!({
            "name": "models/veo/operations/abc",
            "done": true,
            "response": {"generateVideoResponse": {"generatedSamples": [
                {"video": {"uri": "https://example.test/files/v:download"}}
            ]}}
        }))
        .unwrap();
        let video: VideoOperation = op.into();
        assert!(video.done);
        assert_eq!(video.result_locator.as_deref(), Some("https://example.test/files/v:download"));

        let pending: OperationResponse =
            serde_json::from_value(json!({"name": "models/veo/operations/abc"})).unwrap();
        let video: VideoOperation = pending.into();
        assert!(!video.done);
        assert!(video.result_locator.is_none());

        let failed: OperationResponse = serde_json::from_value(json!({
            "name": "op", "done": true, "error": {"code": 8, "message": "quota"}
        }))
        .unwrap();
        let video: VideoOperation = failed.into();
        assert_eq!(video.error.as_deref(), Some("quota (code 8)"));
    }
}
