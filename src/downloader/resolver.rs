// Resolver - URL to normalized VideoCatalog

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::errors::ExtractionError;
use super::format_selector::FormatSelector;
use super::models::VideoCatalog;
use super::traits::MediaBackend;

pub struct Resolver {
    backend: Arc<dyn MediaBackend>,
}

impl Resolver {
    pub fn new(backend: Arc<dyn MediaBackend>) -> Self {
        Self { backend }
    }

    /// Query the backend for metadata and build the selectable catalog
    pub async fn resolve(&self, url: &str) -> Result<VideoCatalog, ExtractionError> {
        debug!(backend = self.backend.name(), url, "extracting metadata");

        let meta = self.backend.extract_metadata(url).await.map_err(|e| {
            warn!(backend = self.backend.name(), url, error = %e, "metadata extraction failed");
            ExtractionError::from(e)
        })?;

        let raw_count = meta.formats.len();
        let formats = FormatSelector::build_catalog_entries(&meta.formats);
        info!(url, raw_count, kept = formats.len(), "resolved video catalog");

        Ok(VideoCatalog {
            title: meta.title,
            thumbnail: meta.thumbnail,
            duration: meta.duration,
            uploader: meta.uploader.or(meta.channel),
            description: meta.description,
            formats,
            url: url.to_string(),
        })
    }
}
