mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{FakeBackend, PNG_BYTES, VIDEO_BYTES};
use promo_studio::api::{self, AppState};
use promo_studio::model::catalog::LOADING_MESSAGES;
use promo_studio::workflow::messages::PROGRESS_VIDEO;
use promo_studio::WorkflowController;

fn app(backend: FakeBackend) -> (Router, Arc<AppState>) {
    app_polling_every(backend, Duration::ZERO)
}

fn app_polling_every(backend: FakeBackend, interval: Duration) -> (Router, Arc<AppState>) {
    let controller = WorkflowController::new(Arc::new(backend)).with_poll_interval(interval);
    let state = AppState::new(controller);
    (api::router(state.clone()), state)
}

/// Upload a product and generate images so a video can be requested.
async fn ready_for_video(app: &Router) {
    assert_eq!(upload_product(app).await.0, StatusCode::OK);
    assert_eq!(send_json(app, Method::POST, "/images/generate").await.0, StatusCode::OK);
}

async fn send(app: &Router, method: Method, uri: &str, content_type: Option<&str>, body: Body) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(ct) = content_type {
        builder = builder.header(header::CONTENT_TYPE, ct);
    }
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, None, Body::empty()).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Same as `send_json`, but takes the router by value so the future is `Send`
/// (axum 0.6 `Router` is not `Sync`, so `&Router` cannot cross `tokio::spawn`).
async fn send_json_owned(app: Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn upload_product(app: &Router) -> (StatusCode, Value) {
    let (status, bytes) = send(app, Method::POST, "/product-image", Some("image/png"), Body::from(PNG_BYTES.to_vec())).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn catalog_lists_every_option_group() {
    let (app, _) = app(FakeBackend::new());
    let (status, body) = send_json(&app, Method::GET, "/catalog").await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body["locations"].as_array().unwrap().is_empty());
    assert!(!body["templates"].as_array().unwrap().is_empty());
    assert!(!body["video_styles"].as_array().unwrap().is_empty());
    assert_eq!(body["aspect_ratios"], json!(["16:9", "9:16"]));
    assert_eq!(body["genders"], json!(["Pria", "Wanita", "Tidak disebutkan"]));
}

#[tokio::test]
async fn generate_without_product_is_bad_request() {
    let (app, _) = app(FakeBackend::new());
    let (status, body) = send_json(&app, Method::POST, "/images/generate").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "validation");
    assert_eq!(
        body["error"]["message"],
        promo_studio::workflow::messages::ERR_NEED_PRODUCT_IMAGE
    );
}

#[tokio::test]
async fn product_upload_returns_analysed_snapshot() {
    let (app, _) = app(FakeBackend::new());
    let (status, body) = upload_product(&app).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["form"]["product_name"], "Kopi Senja");
    assert_eq!(body["form"]["product_image_type"], "image/png");
    assert_eq!(body["progress"]["loading"], false);
    assert!(body["error"].is_null());
}

#[tokio::test]
async fn failed_analysis_is_bad_gateway() {
    let mut fake = FakeBackend::new();
    fake.analysis = None;
    let (app, _) = app(fake);
    let (status, body) = upload_product(&app).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["kind"], "product_image");
}

#[tokio::test]
async fn form_patch_updates_scene() {
    let (app, _) = app(FakeBackend::new());
    let update = json!({
        "type": "output",
        "aspect_ratio": "16:9",
        "resolution": "720p",
        "sound_enabled": false
    });
    let (status, bytes) = send(
        &app,
        Method::PATCH,
        "/form",
        Some("application/json"),
        Body::from(update.to_string()),
    )
    .await;
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["form"]["output"]["aspect_ratio"], "16:9");
    assert_eq!(body["form"]["output"]["sound_enabled"], false);
}

#[tokio::test]
async fn full_flow_ends_with_downloadable_video() {
    let (app, _) = app(FakeBackend::new().with_polls(&[false, true]));

    assert_eq!(upload_product(&app).await.0, StatusCode::OK);

    let (status, body) = send_json(&app, Method::POST, "/images/generate").await;
    assert_eq!(status, StatusCode::OK);
    let images = body["images"].as_array().unwrap();
    assert_eq!(images.len(), 3);
    assert_eq!(body["selected_image"], images[0]["id"]);

    let second = images[1]["id"].as_str().unwrap().to_string();
    let (status, body) = send_json(&app, Method::POST, &format!("/images/{}/select", second)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selected_image"], second.as_str());

    let (status, bytes) = send(&app, Method::GET, &format!("/images/{}", second), None, Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"scene 1");

    let (status, body) = send_json(&app, Method::POST, "/video/generate").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["video_ready"], true);
    assert_eq!(body["operation"]["done"], true);

    let (status, bytes) = send(&app, Method::GET, "/video", None, Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, VIDEO_BYTES);
}

#[tokio::test]
async fn unknown_image_is_rejected() {
    let (app, _) = app(FakeBackend::new());
    let (status, _) = send_json(&app, Method::POST, "/images/img-0-nope/select").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(&app, Method::GET, "/images/img-0-nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(&app, Method::GET, "/video").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn concurrent_action_is_refused_while_progress_stays_readable() {
    let (app, state) = app(FakeBackend::new());
    let _held = state.controller.lock().await;

    let (status, body) = send_json(&app, Method::POST, "/images/generate").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "busy");

    let (status, body) = send_json(&app, Method::GET, "/progress").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loading"], false);
}

#[tokio::test]
async fn dropped_video_request_still_runs_to_completion() {
    let (app, state) = app_polling_every(
        FakeBackend::new().with_polls(&[false; 8]),
        Duration::from_millis(25),
    );
    ready_for_video(&app).await;

    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        send_json(&app, Method::POST, "/video/generate"),
    )
    .await;
    assert!(abandoned.is_err());

    let mut rx = state.progress.clone();
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|p| !p.loading))
        .await
        .expect("video action never finished")
        .unwrap();

    let (status, body) = send_json(&app, Method::GET, "/progress").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loading"], false);
    assert!(body["label"].is_null());
    assert!(body["message"].is_null());

    let (status, bytes) = send(&app, Method::GET, "/video", None, Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, VIDEO_BYTES);

    let (_, body) = send_json(&app, Method::GET, "/state").await;
    assert!(body["loading_message"].is_null());
    assert!(body["error"].is_null());
}

#[tokio::test]
async fn progress_shows_loading_message_while_video_runs() {
    let (app, _) = app_polling_every(
        FakeBackend::new().with_polls(&[false; 8]),
        Duration::from_millis(25),
    );
    ready_for_video(&app).await;

    let running = tokio::spawn({
        let app = app.clone();
        async move { send_json_owned(app, Method::POST, "/video/generate").await }
    });

    let mut during = Value::Null;
    for _ in 0..100 {
        let (_, body) = send_json(&app, Method::GET, "/progress").await;
        if body["label"] == PROGRESS_VIDEO {
            during = body;
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(during["loading"], true);
    assert_eq!(during["message"], LOADING_MESSAGES[0]);

    let (status, _) = send_json(&app, Method::GET, "/state").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = running.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["video_ready"], true);
    assert!(body["progress"]["message"].is_null());
}
