//! Router and shared state of the HTTP dispatcher.
use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};
use tokio::sync::{watch, Mutex};
use tower_http::cors::CorsLayer;

use crate::api::handlers;
use crate::workflow::{Progress, WorkflowController};

/// One session per process. The mutex is only ever `try_lock`ed by action
/// handlers, so a second action is refused instead of queued. Actions run on
/// a spawned task holding an owned guard, so they finish even if the request
/// that started them is dropped.
pub struct AppState {
    pub controller: Arc<Mutex<WorkflowController>>,
    pub progress: watch::Receiver<Progress>,
}

impl AppState {
    pub fn new(controller: WorkflowController) -> Arc<Self> {
        let progress = controller.subscribe_progress();
        Arc::new(AppState {
            controller: Arc::new(Mutex::new(controller)),
            progress,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/catalog", get(handlers::catalog))
        .route("/state", get(handlers::session_state))
        .route("/progress", get(handlers::progress))
        .route("/form", patch(handlers::update_form))
        .route("/product-image", post(handlers::product_image))
        .route("/character-image", post(handlers::character_image))
        .route("/images/generate", post(handlers::generate_images))
        .route("/images/:id/select", post(handlers::select_image))
        .route("/images/:id", get(handlers::get_image))
        .route("/video/generate", post(handlers::generate_video))
        .route("/video", get(handlers::get_video))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
