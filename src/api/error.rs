use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::downloader::{ExtractionError, FailureReason, FetchError};

/// Error returned by handlers; rendered as `{"error": message}`
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

pub fn status_for(reason: FailureReason) -> StatusCode {
    match reason {
        FailureReason::FormatUnavailable => StatusCode::BAD_REQUEST,
        FailureReason::AccessDenied | FailureReason::CopyrightBlocked => StatusCode::FORBIDDEN,
        FailureReason::NotFound => StatusCode::NOT_FOUND,
        FailureReason::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<FetchError> for ApiError {
    fn from(e: FetchError) -> Self {
        let message = match e.reason {
            FailureReason::FormatUnavailable => {
                "Format not available. Try choosing another format.".to_string()
            }
            FailureReason::AccessDenied => {
                "Video is private or members-only. It cannot be downloaded.".to_string()
            }
            FailureReason::NotFound => {
                "Video is not available in this region or has been removed.".to_string()
            }
            FailureReason::CopyrightBlocked => {
                "Video is blocked by a copyright claim. It cannot be downloaded.".to_string()
            }
            FailureReason::Unknown => format!("Download failed: {}", e.message),
        };
        Self::new(status_for(e.reason), message)
    }
}

impl From<ExtractionError> for ApiError {
    fn from(e: ExtractionError) -> Self {
        Self::new(status_for(e.reason()), e.message)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}
