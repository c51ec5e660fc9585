//! Common error type and alias.
//!
//! `AppError` covers every failure the pipeline can produce. The workflow
//! controller never shows these to a user directly; it maps them to a
//! [`UserError`](crate::workflow::UserError) per action and logs the detail.
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Local image resource could not be read or is not an image.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A precondition failed before any remote call was made.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The analysis response was missing fields or was not valid JSON.
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// The image fan-out produced no usable image.
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    /// Fetching a generated artifact returned a non-success status.
    #[error("Download error: {0}")]
    Download(String),

    /// The video job finished without a result locator.
    #[error("Missing result: {0}")]
    MissingResult(String),

    /// The remote service answered with an error status or a failed job.
    #[error("Remote service error: {0}")]
    Remote(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn analysis(msg: impl Into<String>) -> Self {
        Self::Analysis(msg.into())
    }

    pub fn synthesis(msg: impl Into<String>) -> Self {
        Self::Synthesis(msg.into())
    }

    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
