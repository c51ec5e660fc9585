//! In-process stand-in for the remote generation service.
//!
//! Records every call by name so tests can assert exactly which remote
//! capabilities an action touched.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use promo_studio::encoder::ImageSource;
use promo_studio::error::{AppError, AppResult};
use promo_studio::generation::GenerationBackend;
use promo_studio::model::{EncodedImage, FormState, GeneratedImage, ProductInfo, VideoOperation};

pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
pub const VIDEO_URI: &str = "https://files.example.test/video.mp4";
pub const VIDEO_BYTES: &[u8] = b"\x00\x00\x00\x18ftypmp42";

pub fn png_upload() -> ImageSource {
    ImageSource::Bytes {
        bytes: PNG_BYTES.to_vec(),
        content_type: Some("image/png".to_string()),
    }
}

pub fn product_info() -> ProductInfo {
    ProductInfo {
        name: "Kopi Senja".to_string(),
        description: "Kopi susu gula aren yang creamy.".to_string(),
        target_audience: "Pekerja muda perkotaan".to_string(),
    }
}

pub struct FakeBackend {
    calls: Mutex<Vec<&'static str>>,
    poll_script: Mutex<VecDeque<bool>>,
    /// Returned by `remove_background`.
    pub removal: Option<EncodedImage>,
    /// `None` makes analysis fail.
    pub analysis: Option<ProductInfo>,
    /// Number of images synthesized; zero fails.
    pub images: usize,
    /// Whether the submitted job is already complete.
    pub submit_done: bool,
    pub locator: Option<String>,
    pub fail_fetch: bool,
}

impl FakeBackend {
    pub fn new() -> Self {
        FakeBackend {
            calls: Mutex::new(Vec::new()),
            poll_script: Mutex::new(VecDeque::new()),
            removal: None,
            analysis: Some(product_info()),
            images: 3,
            submit_done: false,
            locator: Some(VIDEO_URI.to_string()),
            fail_fetch: false,
        }
    }

    /// `done` flags returned by successive polls. Once exhausted, polls
    /// report completion.
    pub fn with_polls(self, script: &[bool]) -> Self {
        *self.poll_script.lock().unwrap() = script.iter().copied().collect();
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == name).count()
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }

    fn operation(&self, done: bool) -> VideoOperation {
        VideoOperation {
            name: "models/veo/operations/fake".to_string(),
            done,
            result_locator: if done { self.locator.clone() } else { None },
            error: None,
        }
    }
}

#[async_trait]
impl GenerationBackend for FakeBackend {
    async fn analyze_product(&self, _image: &EncodedImage) -> AppResult<ProductInfo> {
        self.record("analyze_product");
        self.analysis
            .clone()
            .ok_or_else(|| AppError::analysis("missing field `targetAudience`"))
    }

    async fn remove_background(&self, _image: &EncodedImage) -> AppResult<Option<EncodedImage>> {
        self.record("remove_background");
        Ok(self.removal.clone())
    }

    async fn synthesize_images(&self, _form: &FormState) -> AppResult<Vec<GeneratedImage>> {
        self.record("synthesize_images");
        if self.images == 0 {
            return Err(AppError::synthesis("no images"));
        }
        Ok((0..self.images)
            .map(|i| GeneratedImage::new(i, EncodedImage::from_bytes(format!("scene {}", i).as_bytes(), "image/jpeg")))
            .collect())
    }

    async fn submit_video(&self, _form: &FormState, _seed: &GeneratedImage) -> AppResult<VideoOperation> {
        self.record("submit_video");
        Ok(self.operation(self.submit_done))
    }

    async fn poll_operation(&self, _operation: &VideoOperation) -> AppResult<VideoOperation> {
        self.record("poll_operation");
        let done = self.poll_script.lock().unwrap().pop_front().unwrap_or(true);
        Ok(self.operation(done))
    }

    async fn fetch_result(&self, locator: &str) -> AppResult<Vec<u8>> {
        self.record("fetch_result");
        if self.fail_fetch {
            return Err(AppError::Download(format!("Failed to download {}: 404", locator)));
        }
        Ok(VIDEO_BYTES.to_vec())
    }
}
