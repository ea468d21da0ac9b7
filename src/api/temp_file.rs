use std::path::{Path, PathBuf};

use tracing::{info, warn};

/// Owns a materialized download; the file is removed when this is dropped.
///
/// Moved into the response body stream so deletion happens after the last
/// chunk is sent, or when the client disconnects.
#[derive(Debug)]
pub struct TempFile {
    path: PathBuf,
}

impl TempFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => info!(path = %self.path.display(), "cleanup: deleted"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "cleanup error"),
        }
    }
}
