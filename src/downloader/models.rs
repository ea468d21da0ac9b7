// Common data models for the resolver and fetcher

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw stream descriptor as reported by yt-dlp
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamDescriptor {
    /// Format ID (e.g., "137", "140")
    #[serde(default)]
    pub format_id: String,
    /// File extension (mp4, webm, m4a)
    pub ext: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<f64>,
    /// Audio bitrate in kbps
    pub abr: Option<f64>,
    /// Video codec (avc1, vp9, av01, "none")
    pub vcodec: Option<String>,
    /// Audio codec (mp4a, opus, "none")
    pub acodec: Option<String>,
    pub filesize: Option<u64>,
    pub filesize_approx: Option<u64>,
    /// Format note (e.g., "1080p", "tiny")
    pub format_note: Option<String>,
}

impl StreamDescriptor {
    /// A track is absent only when yt-dlp says "none"; an unknown codec counts as present
    pub fn has_video(&self) -> bool {
        self.vcodec.as_deref() != Some("none")
    }

    pub fn has_audio(&self) -> bool {
        self.acodec.as_deref() != Some("none")
    }

    /// Get effective file size (exact or approximate)
    pub fn effective_size(&self) -> Option<u64> {
        self.filesize.or(self.filesize_approx)
    }
}

/// Video metadata returned by `extract_metadata`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    /// Duration in seconds
    pub duration: Option<f64>,
    pub uploader: Option<String>,
    pub channel: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub formats: Vec<StreamDescriptor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Video,
    Audio,
}

/// One selectable option shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub format_id: String,
    pub ext: String,
    /// Display label (e.g., "1080p 60fps (no audio)", "128kbps")
    pub quality: String,
    pub filesize: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<f64>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
    /// Audio bitrate in kbps (audio entries only)
    pub abr: Option<f64>,
    pub has_video: bool,
    pub has_audio: bool,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

/// Normalized result of `Resolver::resolve`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoCatalog {
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    pub duration: Option<f64>,
    pub uploader: Option<String>,
    pub description: Option<String>,
    /// Video entries followed by audio entries
    pub formats: Vec<CatalogEntry>,
    pub url: String,
}

impl VideoCatalog {
    pub fn video_entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.formats.iter().filter(|e| e.kind == EntryKind::Video)
    }

    pub fn audio_entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.formats.iter().filter(|e| e.kind == EntryKind::Audio)
    }
}

/// A file materialized in transient storage. The holder is responsible for deleting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    pub path: PathBuf,
}

impl DownloadResult {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "download.mp4".to_string())
    }
}

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Network settings passed to yt-dlp on every call
#[derive(Debug, Clone)]
pub struct NetworkOptions {
    pub no_check_certificate: bool,
    pub geo_bypass: bool,
    pub retries: u32,
    pub fragment_retries: u32,
    /// HTTP chunk size in bytes
    pub http_chunk_size: Option<u64>,
    pub user_agent: String,
    /// Extra request headers as (name, value)
    pub headers: Vec<(String, String)>,
    /// Socket timeout in seconds
    pub socket_timeout: Option<u32>,
}

impl Default for NetworkOptions {
    fn default() -> Self {
        Self {
            no_check_certificate: true,
            geo_bypass: true,
            retries: 3,
            fragment_retries: 3,
            http_chunk_size: Some(10 * 1024 * 1024),
            user_agent: BROWSER_USER_AGENT.to_string(),
            headers: vec![
                (
                    "Accept".to_string(),
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
                ),
                ("Accept-Language".to_string(), "en-us,en;q=0.5".to_string()),
                ("Sec-Fetch-Mode".to_string(), "navigate".to_string()),
            ],
            socket_timeout: Some(30),
        }
    }
}

impl NetworkOptions {
    /// Lighter settings for metadata queries: no retries or chunking
    pub fn for_metadata(&self) -> Self {
        Self {
            retries: 0,
            fragment_retries: 0,
            http_chunk_size: None,
            headers: Vec::new(),
            ..self.clone()
        }
    }

    pub fn with_socket_timeout(mut self, seconds: Option<u32>) -> Self {
        self.socket_timeout = seconds;
        self
    }
}

/// One call to `MediaBackend::materialize`
#[derive(Debug, Clone)]
pub struct MaterializeRequest {
    pub url: String,
    /// yt-dlp format selector (e.g., "best", "137", "bestvideo[height<=1080]+bestaudio/best")
    pub format: String,
    /// Output template, may contain `%(ext)s` / `%(title)s`
    pub output_template: String,
    /// Container to merge separate video+audio into
    pub merge_output_format: Option<String>,
    /// Convert to audio with this codec (e.g., "mp3")
    pub extract_audio: Option<String>,
    pub network: NetworkOptions,
}

impl MaterializeRequest {
    pub fn new(url: &str, format: &str, output_template: &str, network: NetworkOptions) -> Self {
        Self {
            url: url.to_string(),
            format: format.to_string(),
            output_template: output_template.to_string(),
            merge_output_format: None,
            extract_audio: None,
            network,
        }
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = format.to_string();
        self
    }

    pub fn with_merge_output_format(mut self, container: Option<String>) -> Self {
        self.merge_output_format = container;
        self
    }

    pub fn with_extract_audio(mut self, codec: Option<String>) -> Self {
        self.extract_audio = codec;
        self
    }
}
