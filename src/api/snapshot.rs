//! Serializable view of a session, without image or video payloads.
use serde::Serialize;

use crate::model::{CharacterMode, DescribedCharacter, OutputSettings, SceneSettings};
use crate::workflow::{Progress, UserError, WorkflowController};

#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub form: FormSnapshot,
    pub images: Vec<ImageSummary>,
    pub selected_image: Option<String>,
    pub operation: Option<OperationSummary>,
    pub video_ready: bool,
    pub progress: Progress,
    pub loading_message: Option<&'static str>,
    pub error: Option<UserError>,
}

#[derive(Debug, Serialize)]
pub struct FormSnapshot {
    pub product_image_type: Option<String>,
    pub remove_background: bool,
    pub product_name: String,
    pub product_description: String,
    pub target_audience: String,
    pub character_mode: CharacterMode,
    pub described_character: DescribedCharacter,
    pub has_character_image: bool,
    pub scene: SceneSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Serialize)]
pub struct ImageSummary {
    pub id: String,
    pub mime_type: String,
    pub approx_bytes: usize,
}

#[derive(Debug, Serialize)]
pub struct OperationSummary {
    pub name: String,
    pub done: bool,
}

impl SessionSnapshot {
    pub fn of(controller: &WorkflowController) -> Self {
        let form = controller.form();
        SessionSnapshot {
            form: FormSnapshot {
                product_image_type: form.product.image.as_ref().map(|img| img.mime_type.clone()),
                remove_background: form.product.remove_background,
                product_name: form.product.name.clone(),
                product_description: form.product.description.clone(),
                target_audience: form.product.target_audience.clone(),
                character_mode: form.character.mode,
                described_character: form.character.described.clone(),
                has_character_image: form.character.uploaded.is_some(),
                scene: form.scene.clone(),
                output: form.output,
            },
            images: controller
                .images()
                .iter()
                .map(|img| ImageSummary {
                    id: img.id.clone(),
                    mime_type: img.image.mime_type.clone(),
                    approx_bytes: img.image.byte_len(),
                })
                .collect(),
            selected_image: controller.selected_image().map(|img| img.id.clone()),
            operation: controller.operation().map(|op| OperationSummary {
                name: op.name.clone(),
                done: op.done,
            }),
            video_ready: controller.video().is_some(),
            progress: controller.progress(),
            loading_message: controller.loading_message(),
            error: controller.error().cloned(),
        }
    }
}
