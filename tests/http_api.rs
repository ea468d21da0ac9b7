mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{audio, sample_metadata, video, FakeBackend, Outcome};
use video_downloader::api::{router, AppState};
use video_downloader::downloader::{MediaMetadata, NetworkOptions};

fn app(backend: Arc<FakeBackend>, dir: &tempfile::TempDir) -> Router {
    router(AppState::new(
        backend,
        dir.path().to_path_buf(),
        NetworkOptions::default(),
    ))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(Arc::new(FakeBackend::new(MediaMetadata::default())), &dir);

    let response = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn index_lists_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(Arc::new(FakeBackend::new(MediaMetadata::default())), &dir);

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "running");
    assert_eq!(body["endpoints"]["download"], "/api/download (POST)");
}

#[tokio::test]
async fn unknown_path_is_json_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(Arc::new(FakeBackend::new(MediaMetadata::default())), &dir);

    let response = app
        .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Endpoint not found");
    assert!(body["available_endpoints"]["health"].is_string());
}

#[tokio::test]
async fn missing_url_is_rejected_before_backend() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(FakeBackend::new(MediaMetadata::default()));
    let app = app(backend.clone(), &dir);

    let response = app
        .clone()
        .oneshot(post_json("/api/video-info", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "URL is required");

    let response = app
        .oneshot(post_json("/api/download", json!({ "url": "  ", "format_id": "18" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(backend.attempts(), 0);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(Arc::new(FakeBackend::new(MediaMetadata::default())), &dir);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/video-info")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
}

#[tokio::test]
async fn video_info_returns_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(FakeBackend::new(sample_metadata(vec![
        video("22", 720, "mp4", "mp4a.40.2"),
        video("137", 1080, "mp4", "none"),
        audio("140", 128.0, "m4a"),
    ])));
    let app = app(backend, &dir);

    let response = app
        .oneshot(post_json("/api/video-info", json!({ "url": "https://example.com/v" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["title"], "Sample Video");
    assert_eq!(body["uploader"], "Sample Channel");
    assert_eq!(body["url"], "https://example.com/v");

    let formats = body["formats"].as_array().unwrap();
    let ids: Vec<&str> = formats.iter().map(|f| f["format_id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["best", "22", "137", "bestaudio", "140"]);
    assert_eq!(formats[2]["quality"], "1080p (no audio)");
    assert_eq!(formats[4]["type"], "audio");
    assert_eq!(formats[4]["quality"], "128kbps");
}

#[tokio::test]
async fn video_info_private_is_forbidden() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(FakeBackend::failing_metadata(
        "ERROR: [youtube] abc: Private video. Sign in if you've been granted access",
    ));
    let app = app(backend, &dir);

    let response = app
        .oneshot(post_json("/api/video-info", json!({ "url": "https://example.com/p" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("Private video"));
}

#[tokio::test]
async fn download_streams_attachment_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(
        FakeBackend::new(MediaMetadata::default()).with_outcomes(vec![Outcome::Write("mp4")]),
    );
    let app = app(backend.clone(), &dir);

    let response = app
        .oneshot(post_json(
            "/api/download",
            json!({ "url": "https://example.com/v", "format_id": "22" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    assert_eq!(headers[header::CONTENT_TYPE], "video/mp4");
    assert_eq!(headers[header::CONTENT_LENGTH], "16");
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"video_"));
    assert!(disposition.ends_with(".mp4\""));

    let written = backend.written();
    assert_eq!(written.len(), 1);
    assert!(written[0].exists());

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"fake media bytes");
    assert!(!written[0].exists(), "temp file should be removed after streaming");
}

#[tokio::test]
async fn download_failure_statuses_follow_reason() {
    let dir = tempfile::tempdir().unwrap();
    let format_error = "ERROR: Requested format is not available";
    let gone = "ERROR: Video unavailable. This video is not available";
    let backend = Arc::new(FakeBackend::new(MediaMetadata::default()).with_outcomes(vec![
        Outcome::Fail(format_error.to_string()),
        Outcome::Fail(format_error.to_string()),
        Outcome::Fail(gone.to_string()),
        Outcome::Fail(gone.to_string()),
    ]));
    let app = app(backend.clone(), &dir);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/download",
            json!({ "url": "https://example.com/v", "format_id": "999" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().starts_with("Format not available"));

    let response = app
        .oneshot(post_json("/api/download", json!({ "url": "https://example.com/gone" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(backend.attempts(), 4);
}

#[tokio::test]
async fn handler_panic_becomes_500() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(Arc::new(FakeBackend::panicking()), &dir);

    let response = app
        .oneshot(post_json("/api/video-info", json!({ "url": "https://example.com/v" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Internal server error");
    assert_eq!(body["message"], "extractor exploded");
}

#[tokio::test]
async fn cors_preflight_is_allowed() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(Arc::new(FakeBackend::new(MediaMetadata::default())), &dir);

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/download")
        .header(header::ORIGIN, "https://frontend.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}
