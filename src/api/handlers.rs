//! Axum request handlers for the HTTP dispatcher.
//!
//! Action handlers return the session snapshot on success. Failures use
//! `{"error": {"kind", "message"}}` with 400 for validation, 409 when another
//! action is running, 502 when a remote stage failed and 500 if the action
//! task itself died.
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tokio::sync::{MutexGuard, OwnedMutexGuard};

use crate::api::routes::AppState;
use crate::api::snapshot::SessionSnapshot;
use crate::encoder::ImageSource;
use crate::model::catalog::{LOCATIONS, TEMPLATES, VIDEO_STYLES};
use crate::model::{AspectRatio, Ethnicity, FormUpdate, Gender, Resolution};
use crate::workflow::{ActionResult, UserError, WorkflowController};

pub struct ApiError {
    status: StatusCode,
    kind: String,
    message: String,
}

impl ApiError {
    fn busy() -> Self {
        ApiError {
            status: StatusCode::CONFLICT,
            kind: "busy".to_string(),
            message: "Proses lain sedang berjalan. Tunggu hingga selesai.".to_string(),
        }
    }

    fn internal(message: String) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: "internal".to_string(),
            message,
        }
    }

    fn not_found(what: &str) -> Self {
        ApiError {
            status: StatusCode::NOT_FOUND,
            kind: "not_found".to_string(),
            message: format!("{} not found", what),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        let status = if err.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::BAD_GATEWAY
        };
        let kind = serde_json::to_value(err.kind)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        ApiError {
            status,
            kind,
            message: err.message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": { "kind": self.kind, "message": self.message } }));
        (self.status, body).into_response()
    }
}

type Snapshot = Result<Json<SessionSnapshot>, ApiError>;

fn lock(state: &AppState) -> Result<MutexGuard<'_, WorkflowController>, ApiError> {
    state.controller.try_lock().map_err(|_| ApiError::busy())
}

/// A long-running user action, detached from the request that asked for it.
enum Action {
    ProductImage(ImageSource),
    CharacterImage(ImageSource),
    GenerateImages,
    GenerateVideo,
}

impl Action {
    async fn run(self, controller: &mut WorkflowController) -> ActionResult {
        match self {
            Action::ProductImage(source) => controller.on_product_image_chosen(source).await,
            Action::CharacterImage(source) => controller.on_character_image_chosen(source).await,
            Action::GenerateImages => controller.on_generate_images().await,
            Action::GenerateVideo => controller.on_generate_video().await,
        }
    }
}

fn lock_owned(state: &AppState) -> Result<OwnedMutexGuard<WorkflowController>, ApiError> {
    state
        .controller
        .clone()
        .try_lock_owned()
        .map_err(|_| ApiError::busy())
}

/// Run `action` to completion on its own task. Dropping the request only
/// drops the wait for the reply.
async fn dispatch(state: &AppState, action: Action) -> Snapshot {
    let mut controller = lock_owned(state)?;
    let task = tokio::spawn(async move {
        let result = action.run(&mut controller).await;
        (result, SessionSnapshot::of(&controller))
    });
    let (result, snapshot) = task.await.map_err(|e| {
        tracing::error!("Action task failed: {}", e);
        ApiError::internal("Terjadi kesalahan internal.".to_string())
    })?;
    result?;
    Ok(Json(snapshot))
}

fn upload(headers: &HeaderMap, body: Bytes) -> ImageSource {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    ImageSource::Bytes {
        bytes: body.to_vec(),
        content_type,
    }
}

pub async fn root() -> &'static str {
    "Product Promo Studio"
}

pub async fn catalog() -> Json<Value> {
    let labels = |all: Vec<&'static str>| json!(all);
    Json(json!({
        "locations": LOCATIONS,
        "templates": TEMPLATES,
        "video_styles": VIDEO_STYLES,
        "genders": labels(Gender::ALL.iter().map(|g| g.label()).collect()),
        "ethnicities": labels(Ethnicity::ALL.iter().map(|e| e.label()).collect()),
        "aspect_ratios": labels(AspectRatio::ALL.iter().map(|a| a.label()).collect()),
        "resolutions": labels(Resolution::ALL.iter().map(|r| r.label()).collect()),
    }))
}

pub async fn session_state(State(state): State<Arc<AppState>>) -> Snapshot {
    let controller = lock(&state)?;
    Ok(Json(SessionSnapshot::of(&controller)))
}

pub async fn progress(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let progress = state.progress.borrow().clone();
    Json(progress)
}

pub async fn update_form(
    State(state): State<Arc<AppState>>,
    Json(update): Json<FormUpdate>,
) -> Snapshot {
    let mut controller = lock(&state)?;
    tracing::debug!("Form update: {:?}", update);
    controller.apply_update(update);
    Ok(Json(SessionSnapshot::of(&controller)))
}

pub async fn product_image(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Snapshot {
    dispatch(&state, Action::ProductImage(upload(&headers, body))).await
}

pub async fn character_image(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Snapshot {
    dispatch(&state, Action::CharacterImage(upload(&headers, body))).await
}

pub async fn generate_images(State(state): State<Arc<AppState>>) -> Snapshot {
    dispatch(&state, Action::GenerateImages).await
}

pub async fn select_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Snapshot {
    let mut controller = lock(&state)?;
    controller.on_select_image(&id)?;
    Ok(Json(SessionSnapshot::of(&controller)))
}

pub async fn get_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let controller = lock(&state)?;
    let image = controller.image(&id).ok_or_else(|| ApiError::not_found("image"))?;
    let bytes = image.image.decode().map_err(|e| {
        tracing::error!("Stored image {} is not valid base64: {}", id, e);
        ApiError::not_found("image")
    })?;
    Ok(([(header::CONTENT_TYPE, image.image.mime_type.clone())], bytes).into_response())
}

pub async fn generate_video(State(state): State<Arc<AppState>>) -> Snapshot {
    dispatch(&state, Action::GenerateVideo).await
}

pub async fn get_video(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let controller = lock(&state)?;
    let video = controller.video().ok_or_else(|| ApiError::not_found("video"))?;
    Ok(([(header::CONTENT_TYPE, video.mime_type.clone())], video.bytes.clone()).into_response())
}
