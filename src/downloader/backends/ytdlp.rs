// yt-dlp CLI backend - spawns the native `yt-dlp` binary
//
// Metadata: `yt-dlp --dump-json --no-playlist <url>`
// Download: `yt-dlp -f <fmt> -o <template> --print after_move:filepath <url>`

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::downloader::errors::BackendError;
use crate::downloader::models::{MaterializeRequest, MediaMetadata, NetworkOptions, StreamDescriptor};
use crate::downloader::traits::MediaBackend;
use crate::downloader::utils::{find_ytdlp, network_args, run_output_with_timeout};

pub struct YtDlpCli {
    ytdlp_path: String,
    /// Options for metadata queries
    network: NetworkOptions,
    timeout_secs: u64,
}

impl YtDlpCli {
    pub fn new(explicit_path: Option<&str>, network: NetworkOptions, timeout_secs: u64) -> Self {
        Self {
            ytdlp_path: find_ytdlp(explicit_path),
            network: network.for_metadata(),
            timeout_secs,
        }
    }

    pub fn ytdlp_path(&self) -> &str {
        &self.ytdlp_path
    }

    fn metadata_args(&self, url: &str) -> Vec<String> {
        let mut args = vec![
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
        ];
        args.extend(network_args(&self.network));
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    fn download_args(request: &MaterializeRequest) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            request.format.clone(),
            "-o".to_string(),
            request.output_template.clone(),
            "--no-playlist".to_string(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
        ];

        if let Some(container) = &request.merge_output_format {
            args.push("--merge-output-format".to_string());
            args.push(container.clone());
        }

        if let Some(codec) = &request.extract_audio {
            args.push("-x".to_string());
            args.push("--audio-format".to_string());
            args.push(codec.clone());
        }

        args.extend(network_args(&request.network));
        args.push("--".to_string());
        args.push(request.url.clone());
        args
    }

    /// Parse `--dump-json` output
    fn parse_json(stdout: &[u8]) -> Result<MediaMetadata, BackendError> {
        let json_str = String::from_utf8_lossy(stdout);
        let json: serde_json::Value = serde_json::from_str(&json_str)
            .map_err(|e| BackendError::ParseError(format!("Invalid JSON: {}", e)))?;

        let text = |key: &str| json[key].as_str().map(|s| s.to_string());

        Ok(MediaMetadata {
            title: text("title"),
            thumbnail: text("thumbnail"),
            duration: json["duration"].as_f64(),
            uploader: text("uploader"),
            channel: text("channel"),
            description: text("description"),
            formats: Self::parse_formats(&json),
        })
    }

    fn parse_formats(json: &serde_json::Value) -> Vec<StreamDescriptor> {
        let Some(formats_array) = json["formats"].as_array() else {
            return Vec::new();
        };

        formats_array
            .iter()
            .map(|f| StreamDescriptor {
                format_id: f["format_id"].as_str().unwrap_or("").to_string(),
                ext: f["ext"].as_str().map(|s| s.to_string()),
                width: f["width"].as_f64().map(|w| w as u32),
                height: f["height"].as_f64().map(|h| h as u32),
                fps: f["fps"].as_f64(),
                abr: f["abr"].as_f64(),
                vcodec: f["vcodec"].as_str().map(|s| s.to_string()),
                acodec: f["acodec"].as_str().map(|s| s.to_string()),
                filesize: f["filesize"].as_u64(),
                filesize_approx: f["filesize_approx"].as_u64(),
                format_note: f["format_note"].as_str().map(|s| s.to_string()),
            })
            .collect()
    }

    /// The last non-empty stdout line is the final file path
    fn printed_path(stdout: &[u8]) -> Option<PathBuf> {
        String::from_utf8_lossy(stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .last()
            .map(PathBuf::from)
    }
}

#[async_trait]
impl MediaBackend for YtDlpCli {
    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }

    async fn extract_metadata(&self, url: &str) -> Result<MediaMetadata, BackendError> {
        let out = run_output_with_timeout(&self.ytdlp_path, self.metadata_args(url), self.timeout_secs).await?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            warn!(url, status = %out.status, "yt-dlp metadata failed");
            return Err(BackendError::from(stderr.to_string()));
        }

        Self::parse_json(&out.stdout)
    }

    async fn materialize(&self, request: &MaterializeRequest) -> Result<PathBuf, BackendError> {
        let args = Self::download_args(request);
        let out = run_output_with_timeout(&self.ytdlp_path, args, self.timeout_secs).await?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            warn!(url = %request.url, format = %request.format, status = %out.status, "yt-dlp download failed");
            return Err(BackendError::from(stderr.to_string()));
        }

        let path = Self::printed_path(&out.stdout).ok_or_else(|| {
            BackendError::ExecutionError("yt-dlp did not report an output file".to_string())
        })?;
        debug!(path = %path.display(), "yt-dlp wrote file");
        Ok(path)
    }
}
