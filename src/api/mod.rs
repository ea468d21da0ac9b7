// HTTP front-end: JSON API over the resolver and fetcher

pub mod error;
pub mod routes;
pub mod temp_file;

use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header::CONTENT_TYPE, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::downloader::{Fetcher, MediaBackend, NetworkOptions, Resolver};

pub use error::ApiError;

/// Shared by all handlers; holds no mutable state
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
    pub fetcher: Arc<Fetcher>,
}

impl AppState {
    pub fn new(backend: Arc<dyn MediaBackend>, temp_dir: PathBuf, network: NetworkOptions) -> Self {
        Self {
            resolver: Arc::new(Resolver::new(backend.clone())),
            fetcher: Arc::new(Fetcher::new(backend, temp_dir, network)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/", get(routes::index))
        .route("/api/health", get(routes::health))
        .route("/api/video-info", post(routes::video_info))
        .route("/api/download", post(routes::download))
        .fallback(routes::not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    };
    error!(message = %message, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "Internal server error",
            "message": message,
        })),
    )
        .into_response()
}

/// Bind all interfaces on the configured port and serve until Ctrl-C
pub async fn serve(config: &AppConfig, state: AppState) -> Result<()> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Video Downloader API listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
