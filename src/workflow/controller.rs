//! The workflow controller: one session's state machine.
//!
//! Each user action clears the previous error, raises the loading flag with a
//! progress label, runs its pipeline against the [`GenerationBackend`], and
//! lowers the flag again whether it succeeded or not. Remote failures are
//! logged with their cause and surfaced as one fixed message per action.
//!
//! Actions take `&mut self`, so a second action cannot start while one is
//! in flight on the same controller.
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::watch;

use crate::encoder::ImageSource;
use crate::error::AppResult;
use crate::generation::GenerationBackend;
use crate::model::catalog::{self, LOADING_MESSAGE_PERIOD};
use crate::model::media::MP4;
use crate::model::{FormState, FormUpdate, GeneratedImage, VideoArtifact, VideoOperation};
use crate::workflow::messages::*;

/// Delay between two status checks of a running video job.
pub const VIDEO_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Which action produced a [`UserError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    ProductImage,
    CharacterImage,
    ImageGeneration,
    VideoGeneration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct UserError {
    pub kind: ErrorKind,
    pub message: String,
}

impl UserError {
    fn new(kind: ErrorKind, message: &str) -> Self {
        UserError {
            kind,
            message: message.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind == ErrorKind::Validation
    }
}

pub type ActionResult = Result<(), UserError>;

/// Loading indicator as seen by a presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub loading: bool,
    pub label: Option<String>,
    /// Rotating encouragement, only while a video job runs.
    pub message: Option<&'static str>,
}

pub struct WorkflowController {
    backend: Arc<dyn GenerationBackend>,
    form: FormState,
    images: Vec<GeneratedImage>,
    selected: Option<String>,
    operation: Option<VideoOperation>,
    video: Option<VideoArtifact>,
    error: Option<UserError>,
    progress: watch::Sender<Progress>,
    poll_interval: Duration,
    video_started: Option<Instant>,
}

impl WorkflowController {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        let (progress, _) = watch::channel(Progress::default());
        WorkflowController {
            backend,
            form: FormState::default(),
            images: Vec::new(),
            selected: None,
            operation: None,
            video: None,
            error: None,
            progress,
            poll_interval: VIDEO_POLL_INTERVAL,
            video_started: None,
        }
    }

    /// Shorten the video poll delay. Used by tests and demos.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn apply_update(&mut self, update: FormUpdate) {
        self.form.apply(update);
    }

    pub fn images(&self) -> &[GeneratedImage] {
        &self.images
    }

    pub fn image(&self, id: &str) -> Option<&GeneratedImage> {
        self.images.iter().find(|img| img.id == id)
    }

    pub fn selected_image(&self) -> Option<&GeneratedImage> {
        self.selected.as_deref().and_then(|id| self.image(id))
    }

    pub fn operation(&self) -> Option<&VideoOperation> {
        self.operation.as_ref()
    }

    pub fn video(&self) -> Option<&VideoArtifact> {
        self.video.as_ref()
    }

    pub fn error(&self) -> Option<&UserError> {
        self.error.as_ref()
    }

    pub fn progress(&self) -> Progress {
        self.progress.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.progress.borrow().loading
    }

    /// Receiver that observes progress without borrowing the controller.
    pub fn subscribe_progress(&self) -> watch::Receiver<Progress> {
        self.progress.subscribe()
    }

    /// Rotating encouragement shown while a video job runs.
    pub fn loading_message(&self) -> Option<&'static str> {
        self.video_started
            .map(|started| catalog::loading_message(started.elapsed()))
    }

    fn set_progress(&self, label: Option<&str>) {
        self.progress.send_replace(Progress {
            loading: label.is_some(),
            label: label.map(str::to_string),
            message: None,
        });
    }

    fn publish_video_wait(&self) {
        self.progress.send_replace(Progress {
            loading: true,
            label: Some(PROGRESS_VIDEO.to_string()),
            message: self.loading_message(),
        });
    }

    /// Sleep one poll interval, refreshing the loading message at least once
    /// per rotation period.
    async fn wait_for_next_poll(&self) {
        let deadline = Instant::now() + self.poll_interval;
        loop {
            self.publish_video_wait();
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            tokio::time::sleep(remaining.min(LOADING_MESSAGE_PERIOD)).await;
        }
    }

    fn begin(&mut self, label: &str) {
        self.error = None;
        self.set_progress(Some(label));
    }

    fn reject(&mut self, kind: ErrorKind, message: &str) -> ActionResult {
        let err = UserError::new(kind, message);
        tracing::warn!("Rejected action: {}", message);
        self.error = Some(err.clone());
        Err(err)
    }

    /// Lower the loading flag and translate the pipeline outcome.
    fn conclude(&mut self, result: AppResult<()>, kind: ErrorKind, message: &str) -> ActionResult {
        self.set_progress(None);
        match result {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!("{:?} failed: {}", kind, e);
                let err = UserError::new(kind, message);
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Encode the product photo, optionally strip its background, then
    /// auto-fill name, description and audience from the analysis.
    pub async fn on_product_image_chosen(&mut self, source: ImageSource) -> ActionResult {
        self.begin(PROGRESS_ANALYZING);
        let result = self.process_product_image(source).await;
        self.conclude(result, ErrorKind::ProductImage, ERR_PRODUCT_IMAGE)
    }

    async fn process_product_image(&mut self, source: ImageSource) -> AppResult<()> {
        let original = source.encode().await?;
        self.form.product.image = Some(original.clone());

        let mut working = original;
        if self.form.product.remove_background {
            self.set_progress(Some(PROGRESS_REMOVING_BACKGROUND));
            match self.backend.remove_background(&working).await? {
                Some(cleared) => {
                    tracing::info!("Background removed ({} -> {})", working.mime_type, cleared.mime_type);
                    working = cleared;
                    self.form.product.image = Some(working.clone());
                }
                None => tracing::info!("Background removal returned no image, keeping original"),
            }
        }

        self.set_progress(Some(PROGRESS_DESCRIBING));
        let info = self.backend.analyze_product(&working).await?;
        tracing::info!("Product analysed: {}", info.name);
        self.form.apply(FormUpdate::ProductDetails {
            name: info.name,
            description: info.description,
            target_audience: info.target_audience,
        });
        Ok(())
    }

    /// Encode and store the character reference image. No remote call.
    pub async fn on_character_image_chosen(&mut self, source: ImageSource) -> ActionResult {
        self.begin(PROGRESS_CHARACTER);
        let result = match source.encode().await {
            Ok(image) => {
                self.form.character.uploaded = Some(image);
                Ok(())
            }
            Err(e) => Err(e),
        };
        self.conclude(result, ErrorKind::CharacterImage, ERR_CHARACTER_IMAGE)
    }

    /// Synthesize a fresh batch of scene images and select the first.
    pub async fn on_generate_images(&mut self) -> ActionResult {
        self.error = None;
        if self.form.product.image.is_none() {
            return self.reject(ErrorKind::Validation, ERR_NEED_PRODUCT_IMAGE);
        }
        self.begin(PROGRESS_IMAGES);
        self.images.clear();
        self.selected = None;
        self.operation = None;
        self.video = None;

        let result = match self.backend.synthesize_images(&self.form).await {
            Ok(images) => {
                self.selected = images.first().map(|img| img.id.clone());
                self.images = images;
                Ok(())
            }
            Err(e) => Err(e),
        };
        self.conclude(result, ErrorKind::ImageGeneration, ERR_IMAGES)
    }

    /// Mark a generated image as the video seed frame.
    pub fn on_select_image(&mut self, id: &str) -> ActionResult {
        self.error = None;
        if self.image(id).is_none() {
            return self.reject(ErrorKind::Validation, ERR_UNKNOWN_IMAGE);
        }
        self.selected = Some(id.to_string());
        Ok(())
    }

    /// Submit a video job for the selected image, poll it to completion and
    /// download the result.
    pub async fn on_generate_video(&mut self) -> ActionResult {
        self.error = None;
        let seed = match self.selected_image() {
            Some(image) => image.clone(),
            None => return self.reject(ErrorKind::Validation, ERR_NEED_SELECTION),
        };
        self.begin(PROGRESS_VIDEO);
        self.operation = None;
        self.video = None;
        self.video_started = Some(Instant::now());
        self.publish_video_wait();

        let result = self.run_video_job(&seed).await;
        self.video_started = None;
        self.conclude(result, ErrorKind::VideoGeneration, ERR_VIDEO)
    }

    // No iteration cap: the remote job is trusted to terminate.
    async fn run_video_job(&mut self, seed: &GeneratedImage) -> AppResult<()> {
        let mut op = self.backend.submit_video(&self.form, seed).await?;
        self.operation = Some(op.clone());

        let mut polls = 0u32;
        while !op.done {
            self.wait_for_next_poll().await;
            op = self.backend.poll_operation(&op).await?;
            polls += 1;
            tracing::debug!("Operation {} poll #{}: done={}", op.name, polls, op.done);
            self.operation = Some(op.clone());
        }
        tracing::info!("Operation {} finished after {} polls", op.name, polls);

        let locator = op.result_locator()?.to_string();
        let bytes = self.backend.fetch_result(&locator).await?;
        tracing::info!("Downloaded video ({} bytes)", bytes.len());
        self.video = Some(VideoArtifact {
            bytes,
            mime_type: MP4.to_string(),
            source_uri: locator,
        });
        Ok(())
    }
}
