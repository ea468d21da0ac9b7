// Download panel - the GUI controller behind the "Download Now" button
//
// One panel runs at most one background download. The button is disabled
// (state `Running`) for the duration and re-enabled when the task finishes,
// whatever the outcome.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use clap::ValueEnum;
use futures::FutureExt;
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::downloader::{BackendError, MaterializeRequest, MediaBackend, NetworkOptions};

/// Resolution choices shown in the "Res" dropdown (value, label)
pub const RESOLUTIONS: [(u32, &str); 4] = [(2160, "4K"), (1080, "1080p"), (720, "720p"), (480, "480p")];

/// Frame-rate choices shown in the "FPS" dropdown
pub const FRAME_RATES: [u32; 4] = [60, 50, 30, 24];

const ERROR_PREVIEW_CHARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    #[default]
    Mp4,
    Mkv,
    Mp3,
}

impl Container {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mkv => "mkv",
            Self::Mp3 => "mp3",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelOptions {
    pub container: Container,
    pub max_height: u32,
    pub max_fps: u32,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            container: Container::Mp4,
            max_height: 1080,
            max_fps: 60,
        }
    }
}

impl PanelOptions {
    /// Only values offered by the dropdowns are accepted
    pub fn new(container: Container, max_height: u32, max_fps: u32) -> Result<Self, PanelError> {
        if !RESOLUTIONS.iter().any(|(h, _)| *h == max_height) {
            return Err(PanelError::InvalidOption(format!("resolution {}", max_height)));
        }
        if !FRAME_RATES.contains(&max_fps) {
            return Err(PanelError::InvalidOption(format!("fps {}", max_fps)));
        }
        Ok(Self {
            container,
            max_height,
            max_fps,
        })
    }

    /// yt-dlp format selector for these options
    pub fn format_selector(&self) -> String {
        match self.container {
            Container::Mp3 => "bestaudio/best".to_string(),
            _ => format!(
                "bestvideo[height<={}][fps<={}]+bestaudio/best/best",
                self.max_height, self.max_fps
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelState {
    Idle,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Info,
    Success,
    Error,
}

/// What the window shows below the button
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelStatus {
    pub text: String,
    pub tone: Tone,
    /// Progress ring visible and button disabled
    pub busy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelUpdate {
    /// Message attached to the URL field
    InputError(String),
    Status(PanelStatus),
}

/// The UI rendering context; updates are posted from the background task
pub trait StatusSink: Send + Sync {
    fn post(&self, update: PanelUpdate);
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PanelError {
    #[error("Enter a link first")]
    EmptyUrl,

    #[error("A download is already running")]
    Busy,

    #[error("Unsupported option: {0}")]
    InvalidOption(String),
}

pub struct DownloadPanel {
    backend: Arc<dyn MediaBackend>,
    sink: Arc<dyn StatusSink>,
    save_dir: PathBuf,
    network: NetworkOptions,
    state: Arc<Mutex<PanelState>>,
}

/// Puts the panel back to `Idle` when the background task ends, even on panic
struct RunningGuard {
    state: Arc<Mutex<PanelState>>,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        *lock(&self.state) = PanelState::Idle;
    }
}

fn lock(state: &Mutex<PanelState>) -> MutexGuard<'_, PanelState> {
    // The guarded value is a plain enum, a poisoned lock is still usable
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Configured directory, else the user's Download folder, else `./downloads`
pub fn resolve_save_dir(configured: Option<PathBuf>) -> PathBuf {
    configured
        .or_else(dirs::download_dir)
        .unwrap_or_else(|| PathBuf::from("downloads"))
}

impl DownloadPanel {
    pub fn new(
        backend: Arc<dyn MediaBackend>,
        sink: Arc<dyn StatusSink>,
        save_dir: PathBuf,
        network: NetworkOptions,
    ) -> Self {
        Self {
            backend,
            sink,
            save_dir,
            network,
            state: Arc::new(Mutex::new(PanelState::Idle)),
        }
    }

    pub fn state(&self) -> PanelState {
        *lock(&self.state)
    }

    /// Handle a click on the download button.
    ///
    /// Returns the handle of the spawned background task, which resolves to the
    /// written file or the failure shown in the status line. Must be called
    /// from within a tokio runtime.
    pub fn on_download_click(
        &self,
        url: &str,
        options: PanelOptions,
    ) -> Result<JoinHandle<Result<PathBuf, BackendError>>, PanelError> {
        let url = url.trim();
        if url.is_empty() {
            self.sink
                .post(PanelUpdate::InputError(PanelError::EmptyUrl.to_string()));
            return Err(PanelError::EmptyUrl);
        }

        {
            let mut state = lock(&self.state);
            if *state == PanelState::Running {
                return Err(PanelError::Busy);
            }
            *state = PanelState::Running;
        }
        let guard = RunningGuard {
            state: self.state.clone(),
        };

        self.sink.post(PanelUpdate::Status(PanelStatus {
            text: "Processing, please wait...".to_string(),
            tone: Tone::Info,
            busy: true,
        }));

        let request = self.build_request(url, &options);
        let backend = self.backend.clone();
        let sink = self.sink.clone();

        info!(url, format = %request.format, "panel download started");

        Ok(tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(backend.materialize(&request))
                .catch_unwind()
                .await
            {
                Ok(result) => result,
                Err(panic) => Err(BackendError::ExecutionError(format!(
                    "download task panicked: {}",
                    panic_message(&*panic)
                ))),
            };

            let status = match &outcome {
                Ok(path) => {
                    info!(path = %path.display(), "panel download finished");
                    PanelStatus {
                        text: "Done! Check your Download folder".to_string(),
                        tone: Tone::Success,
                        busy: false,
                    }
                }
                Err(e) => {
                    error!(url = %request.url, error = %e, "panel download failed");
                    PanelStatus {
                        text: error_preview(&e.to_string()),
                        tone: Tone::Error,
                        busy: false,
                    }
                }
            };

            drop(guard);
            sink.post(PanelUpdate::Status(status));
            outcome
        }))
    }

    fn build_request(&self, url: &str, options: &PanelOptions) -> MaterializeRequest {
        let template = self
            .save_dir
            .join("%(title)s.%(ext)s")
            .to_string_lossy()
            .to_string();

        let request = MaterializeRequest::new(url, &options.format_selector(), &template, self.network.clone());
        match options.container {
            Container::Mp3 => request.with_extract_audio(Some("mp3".to_string())),
            other => request.with_merge_output_format(Some(other.as_str().to_string())),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    }
}

/// "Error: <first 30 chars>..."
fn error_preview(message: &str) -> String {
    let head: String = message.chars().take(ERROR_PREVIEW_CHARS).collect();
    format!("Error: {}...", head)
}

/// Prints updates to the terminal
pub struct ConsoleSink;

impl StatusSink for ConsoleSink {
    fn post(&self, update: PanelUpdate) {
        match update {
            PanelUpdate::InputError(message) => eprintln!("⚠️  {}", message),
            PanelUpdate::Status(status) => match status.tone {
                Tone::Info => println!("⏳ {}", status.text),
                Tone::Success => println!("✅ {}", status.text),
                Tone::Error => eprintln!("❌ {}", status.text),
            },
        }
    }
}
