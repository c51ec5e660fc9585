//! Gemini-backed implementation of [`GenerationBackend`].
//!
//! Image synthesis has two strategies selected by configuration:
//! inline references fan out three image-to-image requests concurrently,
//! text-only asks the Imagen model for three samples in one request.
use std::future::Future;

use async_trait::async_trait;
use futures_util::future::join_all;
use serde_json::json;

use crate::config::{Config, Models, SynthesisStrategy};
use crate::error::{AppError, AppResult};
use crate::generation::gemini::GeminiClient;
use crate::generation::wire::{
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, ImagenInstance,
    ImagenParameters, OutputOptions, Part, PredictRequest, SeedFrame, VideoInstance,
    VideoParameters,
};
use crate::generation::{GenerationBackend, IMAGES_PER_BATCH};
use crate::model::media::{JPEG, PNG};
use crate::model::{
    CharacterSource, EncodedImage, FormState, GeneratedImage, ProductInfo, VideoOperation,
};
use crate::prompt::{
    build_analysis_prompt, build_background_removal_prompt, build_image_synthesis_prompt,
    build_video_synthesis_prompt,
};

#[derive(Clone)]
pub struct GeminiGenerator {
    client: GeminiClient,
    models: Models,
    strategy: SynthesisStrategy,
}

impl GeminiGenerator {
    pub fn new(client: GeminiClient, models: Models, strategy: SynthesisStrategy) -> Self {
        GeminiGenerator {
            client,
            models,
            strategy,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(GeminiClient::from_config(config), config.models.clone(), config.strategy)
    }

    fn analysis_schema() -> serde_json::Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "namaProduk": { "type": "STRING" },
                "deskripsiProduk": { "type": "STRING" },
                "targetAudience": { "type": "STRING" }
            },
            "required": ["namaProduk", "deskripsiProduk", "targetAudience"]
        })
    }

    /// Three concurrent image-to-image requests. Each settles on its own;
    /// failures and empty responses are dropped, order follows issue order.
    async fn synthesize_with_references(&self, form: &FormState) -> AppResult<Vec<GeneratedImage>> {
        let product = form
            .product
            .image
            .as_ref()
            .ok_or_else(|| AppError::validation("product image is required"))?;
        let prompt = build_image_synthesis_prompt(form, Some(product));

        let mut parts = vec![Part::image(product)];
        if let CharacterSource::Uploaded(character) = form.character.source() {
            parts.push(Part::image(character));
        }
        parts.push(Part::text(prompt));
        let request = GenerateContentRequest::new(parts).with_config(GenerationConfig::image_and_text());

        Ok(fan_out(IMAGES_PER_BATCH, |_| self.client.generate_content(&self.models.image, &request)).await)
    }

    /// One text-only Imagen request for three samples.
    async fn synthesize_text_only(&self, form: &FormState) -> AppResult<Vec<GeneratedImage>> {
        let request = PredictRequest {
            instances: vec![ImagenInstance {
                prompt: build_image_synthesis_prompt(form, None),
            }],
            parameters: ImagenParameters {
                sample_count: IMAGES_PER_BATCH as u32,
                aspect_ratio: form.output.aspect_ratio.label().to_string(),
                output_options: OutputOptions {
                    mime_type: JPEG.to_string(),
                },
            },
        };
        let response = self.client.predict(&self.models.imagen, &request).await?;
        Ok(response
            .predictions
            .into_iter()
            .filter_map(|p| {
                let data = p.bytes_base64_encoded.filter(|d| !d.is_empty())?;
                Some(EncodedImage::new(data, p.mime_type.unwrap_or_else(|| JPEG.to_string())))
            })
            .take(IMAGES_PER_BATCH)
            .enumerate()
            .map(|(index, image)| GeneratedImage::new(index, image))
            .collect())
    }
}

/// Issue `count` requests concurrently and keep the images they produced.
/// Failed or image-less requests are dropped; survivors stay in issue order
/// whatever order they completed in.
async fn fan_out<F, Fut>(count: usize, request: F) -> Vec<GeneratedImage>
where
    F: Fn(usize) -> Fut,
    Fut: Future<Output = AppResult<GenerateContentResponse>>,
{
    let settled = join_all((0..count).map(request)).await;

    let mut images = Vec::with_capacity(count);
    for (index, result) in settled.into_iter().enumerate() {
        match result {
            Ok(response) => match response.first_image() {
                Some(image) => images.push(GeneratedImage::new(index, image)),
                None => tracing::warn!("Synthesis request {} returned no image", index),
            },
            Err(e) => tracing::warn!("Synthesis request {} failed: {}", index, e),
        }
    }
    images
}

#[async_trait]
impl GenerationBackend for GeminiGenerator {
    async fn analyze_product(&self, image: &EncodedImage) -> AppResult<ProductInfo> {
        let request = GenerateContentRequest::new(vec![Part::image(image), Part::text(build_analysis_prompt())])
            .with_config(GenerationConfig::json(Self::analysis_schema()));
        let response = self
            .client
            .generate_content(&self.models.analysis, &request)
            .await?;
        let text = response
            .text()
            .ok_or_else(|| AppError::analysis("response contained no text"))?;
        serde_json::from_str(text.trim())
            .map_err(|e| AppError::analysis(format!("malformed product info: {}", e)))
    }

    async fn remove_background(&self, image: &EncodedImage) -> AppResult<Option<EncodedImage>> {
        let request = GenerateContentRequest::new(vec![
            Part::image(image),
            Part::text(build_background_removal_prompt()),
        ])
        .with_config(GenerationConfig::image_and_text());
        let response = self.client.generate_content(&self.models.image, &request).await?;
        Ok(response.first_image().map(|img| EncodedImage::new(img.data, PNG)))
    }

    async fn synthesize_images(&self, form: &FormState) -> AppResult<Vec<GeneratedImage>> {
        let images = match self.strategy {
            SynthesisStrategy::InlineReferences => self.synthesize_with_references(form).await?,
            SynthesisStrategy::TextOnly => self.synthesize_text_only(form).await?,
        };
        if images.is_empty() {
            return Err(AppError::synthesis(format!(
                "none of the {} requested images were produced",
                IMAGES_PER_BATCH
            )));
        }
        tracing::info!("Synthesized {} of {} images ({})", images.len(), IMAGES_PER_BATCH, self.strategy);
        Ok(images)
    }

    async fn submit_video(&self, form: &FormState, seed: &GeneratedImage) -> AppResult<VideoOperation> {
        let request = PredictRequest {
            instances: vec![VideoInstance {
                prompt: build_video_synthesis_prompt(form),
                image: SeedFrame {
                    bytes_base64_encoded: seed.image.data.clone(),
                    mime_type: seed.image.mime_type.clone(),
                },
            }],
            parameters: VideoParameters {
                sample_count: 1,
                aspect_ratio: form.output.aspect_ratio.label().to_string(),
            },
        };
        let op = self
            .client
            .predict_long_running(&self.models.video, &request)
            .await?;
        if op.name.is_empty() {
            return Err(AppError::remote("video job was created without an operation name"));
        }
        Ok(op.into())
    }

    async fn poll_operation(&self, operation: &VideoOperation) -> AppResult<VideoOperation> {
        let refreshed: VideoOperation = self.client.get_operation(&operation.name).await?.into();
        if refreshed.name != operation.name && !refreshed.name.is_empty() {
            tracing::warn!("Polled {} but service answered for {}", operation.name, refreshed.name);
        }
        Ok(VideoOperation {
            name: operation.name.clone(),
            ..refreshed
        })
    }

    async fn fetch_result(&self, locator: &str) -> AppResult<Vec<u8>> {
        self.client.download(locator).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::generation::wire::{Candidate, Content};

    fn reply(data: &str) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content {
                    parts: vec![Part::image(&EncodedImage::new(data, PNG))],
                }),
            }],
        }
    }

    #[tokio::test]
    async fn fan_out_keeps_issue_order_when_completion_is_reversed() {
        let images = fan_out(3, |index| async move {
            tokio::time::sleep(Duration::from_millis(60 - 20 * index as u64)).await;
            Ok(reply(&format!("image-{}", index)))
        })
        .await;

        let data: Vec<&str> = images.iter().map(|img| img.image.data.as_str()).collect();
        assert_eq!(data, ["image-0", "image-1", "image-2"]);
        for (index, img) in images.iter().enumerate() {
            assert!(img.id.starts_with(&format!("img-{}-", index)));
        }
    }

    #[tokio::test]
    async fn fan_out_drops_failures_but_keeps_original_indices() {
        let images = fan_out(3, |index| async move {
            match index {
                0 => Err(AppError::remote("overloaded")),
                1 => Ok(GenerateContentResponse::default()),
                _ => Ok(reply("last")),
            }
        })
        .await;

        assert_eq!(images.len(), 1);
        assert_eq!(images[0].image.data, "last");
        assert!(images[0].id.starts_with("img-2-"));
    }
}
