//! Env-driven configuration for the service, the CLI and the library.
//!
//! Values are read from the process environment; `dotenv` is loaded on demand
//! by the binaries. Everything except the API key has a development default.
use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// How image synthesis talks to the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SynthesisStrategy {
    /// Three concurrent image-to-image requests with the product (and
    /// character) images inlined next to the prompt.
    #[default]
    InlineReferences,
    /// One text-only request asking the image model for three samples.
    TextOnly,
}

impl FromStr for SynthesisStrategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" | "inline-references" => Ok(SynthesisStrategy::InlineReferences),
            "text" | "text-only" => Ok(SynthesisStrategy::TextOnly),
            other => Err(AppError::config(format!(
                "Unknown PROMPT_STRATEGY '{}', expected 'inline' or 'text'",
                other
            ))),
        }
    }
}

impl fmt::Display for SynthesisStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthesisStrategy::InlineReferences => write!(f, "inline"),
            SynthesisStrategy::TextOnly => write!(f, "text"),
        }
    }
}

/// Model names for each remote capability.
#[derive(Debug, Clone)]
pub struct Models {
    pub analysis: String,
    pub image: String,
    pub imagen: String,
    pub video: String,
}

impl Default for Models {
    fn default() -> Self {
        Models {
            analysis: "gemini-2.5-flash".to_string(),
            image: "gemini-2.5-flash-image".to_string(),
            imagen: "imagen-4.0-generate-001".to_string(),
            video: "veo-2.0-generate-001".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub models: Models,
    pub strategy: SynthesisStrategy,
    pub api_host: String,
    pub api_port: String,
    pub output_dir: String,
}

impl Config {
    pub fn dotenv_load() {
        dotenv::dotenv().ok();
    }

    pub fn new() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. `new` uses the process
    /// environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AppError::config("GEMINI_API_KEY environment variable not set"))?;
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let defaults = Models::default();

        let strategy = match lookup("PROMPT_STRATEGY") {
            Some(s) => s.parse()?,
            None => SynthesisStrategy::default(),
        };

        Ok(Config {
            api_key,
            base_url: get("GEMINI_BASE_URL", DEFAULT_BASE_URL),
            models: Models {
                analysis: get("ANALYSIS_MODEL", &defaults.analysis),
                image: get("IMAGE_MODEL", &defaults.image),
                imagen: get("IMAGEN_MODEL", &defaults.imagen),
                video: get("VIDEO_MODEL", &defaults.video),
            },
            strategy,
            api_host: get("API_HOST", "127.0.0.1"),
            api_port: get("API_PORT", "8190"),
            output_dir: get("OUTPUT_DIR", "./output"),
        })
    }

    pub fn print_env_vars(&self) {
        tracing::info!("GEMINI_API_KEY: {}", mask(&self.api_key));
        tracing::info!("GEMINI_BASE_URL: {}", self.base_url);
        tracing::info!(
            "MODELS: analysis={} image={} imagen={} video={}",
            self.models.analysis,
            self.models.image,
            self.models.imagen,
            self.models.video
        );
        tracing::info!("PROMPT_STRATEGY: {}", self.strategy);
        tracing::info!("API_HOST: {}", self.api_host);
        tracing::info!("API_PORT: {}", self.api_port);
        tracing::info!("OUTPUT_DIR: {}", self.output_dir);
    }
}

fn mask(key: &str) -> String {
    let visible: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("****{}", visible)
}
