//! Product Promo Studio library
//!
//! Turns a product photo into a short promo video by driving a hosted
//! generative service through analysis, background removal, scene image
//! synthesis and video synthesis.
//!
//! Modules:
//! - `api`: Axum router and handlers that dispatch user actions over HTTP.
//! - `generation`: Gemini REST client and the `GenerationBackend` seam.
//! - `prompt`: Prompt builders for each remote capability.
//! - `workflow`: The per-session controller and its user-facing messages.
//! - `model`: Form state, media payloads and the option catalog.
//! - `encoder`: Image file/bytes to base64 payload plus media type.
//! - `config`: Env-driven configuration loader.
//! - `error`: Common error type and alias.
//!
//! Re-exports are provided for common types: `Config`, `GeminiClient`,
//! `GeminiGenerator`, `GenerationBackend`, and `WorkflowController`.
pub mod api;
pub mod config;
pub mod encoder;
pub mod error;
pub mod generation;
pub mod model;
pub mod prompt;
pub mod workflow;

pub use config::Config;
pub use generation::{GeminiClient, GeminiGenerator, GenerationBackend};
pub use workflow::WorkflowController;
