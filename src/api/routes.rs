use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_util::io::ReaderStream;
use tracing::{error, info};

use super::error::ApiError;
use super::temp_file::TempFile;
use super::AppState;
use crate::downloader::VideoCatalog;

#[derive(Debug, Deserialize)]
pub struct VideoInfoRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub format_id: Option<String>,
}

fn required_url(url: Option<String>) -> Result<String, ApiError> {
    url.map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::bad_request("URL is required"))
}

fn endpoint_list(with_methods: bool) -> Value {
    if with_methods {
        json!({
            "health": "/api/health (GET)",
            "video_info": "/api/video-info (POST)",
            "download": "/api/download (POST)",
        })
    } else {
        json!({
            "health": "/api/health",
            "video_info": "/api/video-info (POST)",
            "download": "/api/download (POST)",
        })
    }
}

pub async fn index() -> Json<Value> {
    Json(json!({
        "name": "Video Downloader API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": endpoint_list(false),
        "message": "API is working! Use the endpoints above.",
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Video Downloader API is running",
    }))
}

pub async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Endpoint not found",
            "available_endpoints": endpoint_list(true),
        })),
    )
}

pub async fn video_info(
    State(state): State<AppState>,
    payload: Result<Json<VideoInfoRequest>, JsonRejection>,
) -> Result<Json<VideoCatalog>, ApiError> {
    let Json(req) = payload?;
    let url = required_url(req.url)?;
    info!(url = %url, "video info request");

    let catalog = state.resolver.resolve(&url).await?;
    Ok(Json(catalog))
}

pub async fn download(
    State(state): State<AppState>,
    payload: Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;
    let url = required_url(req.url)?;
    info!(url = %url, format = ?req.format_id, "download request");

    let result = state
        .fetcher
        .fetch(&url, req.format_id.as_deref())
        .await
        .map_err(|e| {
            error!(url = %url, reason = e.reason.as_str(), error = %e.message, "download error");
            ApiError::from(e)
        })?;

    let filename = result.file_name();
    let guard = TempFile::new(result.path);

    let file = tokio::fs::File::open(guard.path())
        .await
        .map_err(|e| ApiError::internal(format!("File download failed - {}", e)))?;
    let size = file
        .metadata()
        .await
        .map_err(|e| ApiError::internal(format!("File download failed - {}", e)))?
        .len();

    info!(path = %guard.path().display(), size, "download successful");

    // The guard rides along with the stream and deletes the file once it is dropped
    let stream = ReaderStream::new(file).map(move |chunk| {
        let _keep = &guard;
        chunk
    });

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("video/mp4"));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(size));
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_str(&content_disposition(&filename))
            .map_err(|_| ApiError::internal("Could not build download header"))?,
    );

    Ok((headers, Body::from_stream(stream)).into_response())
}

/// `attachment; filename="..."` with characters that would break the header replaced
fn content_disposition(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_url() {
        assert!(required_url(None).is_err());
        assert!(required_url(Some("   ".to_string())).is_err());
        assert_eq!(
            required_url(Some(" https://x.test/v ".to_string())).unwrap(),
            "https://x.test/v"
        );
    }

    #[test]
    fn test_content_disposition_sanitizes() {
        assert_eq!(
            content_disposition("video_1.mp4"),
            "attachment; filename=\"video_1.mp4\""
        );
        assert_eq!(
            content_disposition("a\"b\u{e9}.mp4"),
            "attachment; filename=\"a_b_.mp4\""
        );
    }
}
