//! Thin HTTP client for the Gemini REST endpoints.
//!
//! - `generate_content` posts to `models/<model>:generateContent`.
//! - `predict` posts to `models/<model>:predict` (Imagen).
//! - `predict_long_running` starts a job via `models/<model>:predictLongRunning`.
//! - `get_operation` re-fetches a job by its operation name.
//! - `download` fetches a generated artifact by URI and returns raw bytes.
//!
//! Every request carries the API key in the `x-goog-api-key` header.
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::generation::wire::{
    GenerateContentRequest, GenerateContentResponse, OperationResponse, PredictRequest,
    PredictResponse,
};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        GeminiClient {
            client: Client::new(),
            base_url: base,
            api_key,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.base_url.clone(), config.api_key.clone())
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(API_KEY_HEADER, &self.api_key)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> AppResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!("POST {}", url);
        let response = self
            .authed(self.client.post(&url))
            .json(body)
            .send()
            .await
            .map_err(AppError::HttpClient)?;
        Self::parse(path, response).await
    }

    async fn parse<R: DeserializeOwned>(path: &str, response: Response) -> AppResult<R> {
        if response.status().is_success() {
            response.json().await.map_err(AppError::HttpClient)
        } else {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            let error_message = format!("Request to {} failed. Status: {}, Body: {}", path, status, error_body);
            tracing::error!("{}", error_message);
            Err(AppError::Remote(error_message))
        }
    }

    /// Multimodal generation: text, JSON or inline images depending on the
    /// request's generation config.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> AppResult<GenerateContentResponse> {
        tracing::info!("generateContent on {}", model);
        self.post_json(&format!("models/{}:generateContent", model), request)
            .await
    }

    /// Imagen-style synchronous prediction.
    pub async fn predict<I, P>(&self, model: &str, request: &PredictRequest<I, P>) -> AppResult<PredictResponse>
    where
        I: Serialize + Sync,
        P: Serialize + Sync,
    {
        tracing::info!("predict on {}", model);
        self.post_json(&format!("models/{}:predict", model), request).await
    }

    /// Start a long-running prediction and return its operation.
    pub async fn predict_long_running<I, P>(
        &self,
        model: &str,
        request: &PredictRequest<I, P>,
    ) -> AppResult<OperationResponse>
    where
        I: Serialize + Sync,
        P: Serialize + Sync,
    {
        tracing::info!("predictLongRunning on {}", model);
        let op: OperationResponse = self
            .post_json(&format!("models/{}:predictLongRunning", model), request)
            .await?;
        tracing::info!("Started operation {}", op.name);
        Ok(op)
    }

    /// Fetch the current state of an operation. Safe to call repeatedly.
    pub async fn get_operation(&self, name: &str) -> AppResult<OperationResponse> {
        let name = name.trim_start_matches('/');
        let url = format!("{}/{}", self.base_url, name);
        let response = self
            .authed(self.client.get(&url))
            .send()
            .await
            .map_err(AppError::HttpClient)?;
        Self::parse(name, response).await
    }

    /// Download a generated artifact.
    pub async fn download(&self, uri: &str) -> AppResult<Vec<u8>> {
        tracing::info!("Downloading {}", uri);
        let response = self
            .authed(self.client.get(uri))
            .send()
            .await
            .map_err(AppError::HttpClient)?;

        if response.status().is_success() {
            response.bytes().await.map(|b| b.to_vec()).map_err(AppError::HttpClient)
        } else {
            Err(AppError::Download(format!("Failed to download {}: {:?}", uri, response.status())))
        }
    }
}
