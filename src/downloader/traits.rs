// Extraction backend trait definition

use async_trait::async_trait;
use std::path::PathBuf;

use super::errors::BackendError;
use super::models::{MaterializeRequest, MediaMetadata};

/// The external media-extraction capability.
///
/// Implementations own all site-specific logic; the rest of the crate only
/// post-processes what they return.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Name of the backend (for logging)
    fn name(&self) -> &'static str;

    /// Fetch metadata and the raw format list without downloading
    async fn extract_metadata(&self, url: &str) -> Result<MediaMetadata, BackendError>;

    /// Download to `request.output_template`, returning the path actually written
    async fn materialize(&self, request: &MaterializeRequest) -> Result<PathBuf, BackendError>;
}
