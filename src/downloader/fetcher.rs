// Fetcher - materializes one file in transient storage with a single "best" fallback

use std::path::PathBuf;
use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::errors::{BackendError, FetchError};
use super::format_selector::BEST_VIDEO_ID;
use super::models::{DownloadResult, MaterializeRequest, NetworkOptions};
use super::traits::MediaBackend;

pub struct Fetcher {
    backend: Arc<dyn MediaBackend>,
    temp_dir: PathBuf,
    network: NetworkOptions,
}

/// Why a single attempt did not produce a file
enum AttemptError {
    Backend(BackendError),
    Missing(PathBuf),
}

impl AttemptError {
    fn message(&self) -> String {
        match self {
            Self::Backend(e) => e.to_string(),
            Self::Missing(path) => format!(
                "Download completed but file not found: {}",
                path.display()
            ),
        }
    }
}

impl Fetcher {
    pub fn new(backend: Arc<dyn MediaBackend>, temp_dir: PathBuf, network: NetworkOptions) -> Self {
        Self {
            backend,
            temp_dir,
            network,
        }
    }

    /// Download `url` in `format_id` (default "best").
    ///
    /// Any failure of the first attempt triggers exactly one retry with "best";
    /// the retry's error is the one reported.
    pub async fn fetch(&self, url: &str, format_id: Option<&str>) -> Result<DownloadResult, FetchError> {
        let format = format_id
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(BEST_VIDEO_ID);

        let stem = Self::output_stem();
        let template = self.output_template(&stem);
        let request = MaterializeRequest::new(url, format, &template, self.network.clone());

        let first = match self.attempt(&request).await {
            Ok(path) => return Ok(DownloadResult { path }),
            Err(e) => e,
        };

        warn!(
            url,
            format,
            error = %first.message(),
            "first attempt failed, trying fallback"
        );

        let fallback = request.with_format(BEST_VIDEO_ID);
        let result = match self.attempt(&fallback).await {
            Ok(path) => Ok(DownloadResult { path }),
            Err(e @ AttemptError::Missing(_)) => Err(FetchError::unknown(e.message())),
            Err(AttemptError::Backend(e)) => Err(FetchError::classified(e.to_string())),
        };

        if result.is_err() {
            self.discard_leftovers(&stem).await;
        }
        result
    }

    async fn attempt(&self, request: &MaterializeRequest) -> Result<PathBuf, AttemptError> {
        info!(
            backend = self.backend.name(),
            url = %request.url,
            format = %request.format,
            "materializing"
        );
        let path = self
            .backend
            .materialize(request)
            .await
            .map_err(AttemptError::Backend)?;

        match tokio::fs::try_exists(&path).await {
            Ok(true) => Ok(path),
            _ => Err(AttemptError::Missing(path)),
        }
    }

    /// A file stem unique to this call: timestamp plus a random token
    fn output_stem() -> String {
        let stamp = OffsetDateTime::now_utc().unix_timestamp_nanos();
        let token = Uuid::new_v4().simple();
        format!("video_{}_{}", stamp, token)
    }

    fn output_template(&self, stem: &str) -> String {
        self.temp_dir
            .join(format!("{}.%(ext)s", stem))
            .to_string_lossy()
            .to_string()
    }

    /// Remove what failed attempts left under this stem (`.part`, `.f137.mp4`, ...)
    async fn discard_leftovers(&self, stem: &str) {
        let prefix = format!("{}.", stem);
        let mut entries = match tokio::fs::read_dir(&self.temp_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %self.temp_dir.display(), error = %e, "cannot scan temp dir");
                return;
            }
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            if !entry.file_name().to_string_lossy().starts_with(&prefix) {
                continue;
            }
            let path = entry.path();
            match tokio::fs::remove_file(&path).await {
                Ok(()) => info!(path = %path.display(), "cleanup: removed partial download"),
                Err(e) => warn!(path = %path.display(), error = %e, "cleanup error"),
            }
        }
    }
}
