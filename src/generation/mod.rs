//! Remote generation capabilities.
//!
//! [`GenerationBackend`] is the seam the workflow controller talks to.
//! [`GeminiGenerator`] implements it over [`GeminiClient`]; tests substitute
//! an in-process fake.
use async_trait::async_trait;

use crate::error::AppResult;
use crate::model::{EncodedImage, FormState, GeneratedImage, ProductInfo, VideoOperation};

pub mod gemini;
pub mod service;
pub mod wire;

pub use gemini::GeminiClient;
pub use service::GeminiGenerator;

/// Number of scene images requested per synthesis call.
pub const IMAGES_PER_BATCH: usize = 3;

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Name, description and audience of the product shown in `image`.
    async fn analyze_product(&self, image: &EncodedImage) -> AppResult<ProductInfo>;

    /// Background-free PNG of `image`, or `None` when the service returned
    /// no image. `None` means "skip this step", not failure.
    async fn remove_background(&self, image: &EncodedImage) -> AppResult<Option<EncodedImage>>;

    /// Up to [`IMAGES_PER_BATCH`] scene images in request order. Fails only
    /// when no image at all was produced.
    async fn synthesize_images(&self, form: &FormState) -> AppResult<Vec<GeneratedImage>>;

    /// Start a video job seeded with `seed`.
    async fn submit_video(&self, form: &FormState, seed: &GeneratedImage) -> AppResult<VideoOperation>;

    /// Refresh a job's status.
    async fn poll_operation(&self, operation: &VideoOperation) -> AppResult<VideoOperation>;

    /// Download a finished artifact.
    async fn fetch_result(&self, locator: &str) -> AppResult<Vec<u8>>;
}
