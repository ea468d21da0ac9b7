#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

use video_downloader::downloader::{
    BackendError, MaterializeRequest, MediaBackend, MediaMetadata, StreamDescriptor,
};

/// What one `materialize` call does
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Write a small file, substituting `%(ext)s` with this extension
    Write(&'static str),
    Fail(String),
    /// Report success for a path that does not exist
    ReportMissing,
    /// Leave a partial file with this suffix behind, then fail
    FailLeaving(&'static str, String),
    Panic,
}

/// Deterministic stand-in for yt-dlp
pub struct FakeBackend {
    metadata: Result<MediaMetadata, String>,
    outcomes: Mutex<VecDeque<Outcome>>,
    requests: Mutex<Vec<MaterializeRequest>>,
    written: Mutex<Vec<PathBuf>>,
    panic_on_metadata: bool,
}

impl FakeBackend {
    pub fn new(metadata: MediaMetadata) -> Self {
        Self {
            metadata: Ok(metadata),
            outcomes: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            written: Mutex::new(Vec::new()),
            panic_on_metadata: false,
        }
    }

    pub fn failing_metadata(message: &str) -> Self {
        Self {
            metadata: Err(message.to_string()),
            ..Self::new(MediaMetadata::default())
        }
    }

    pub fn panicking() -> Self {
        Self {
            panic_on_metadata: true,
            ..Self::new(MediaMetadata::default())
        }
    }

    pub fn with_outcomes(self, outcomes: Vec<Outcome>) -> Self {
        *self.outcomes.lock().unwrap() = outcomes.into();
        self
    }

    pub fn attempts(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<MaterializeRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn written(&self) -> Vec<PathBuf> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaBackend for FakeBackend {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn extract_metadata(&self, _url: &str) -> Result<MediaMetadata, BackendError> {
        if self.panic_on_metadata {
            panic!("extractor exploded");
        }
        self.metadata.clone().map_err(BackendError::Upstream)
    }

    async fn materialize(&self, request: &MaterializeRequest) -> Result<PathBuf, BackendError> {
        self.requests.lock().unwrap().push(request.clone());
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Outcome::Fail("no scripted outcome".to_string()));

        match outcome {
            Outcome::Write(ext) => {
                let path = PathBuf::from(
                    request
                        .output_template
                        .replace("%(ext)s", ext)
                        .replace("%(title)s", "Sample"),
                );
                std::fs::write(&path, b"fake media bytes").unwrap();
                self.written.lock().unwrap().push(path.clone());
                Ok(path)
            }
            Outcome::Fail(message) => Err(BackendError::Upstream(message)),
            Outcome::ReportMissing => Ok(PathBuf::from(
                request.output_template.replace("%(ext)s", "mp4"),
            )),
            Outcome::FailLeaving(suffix, message) => {
                let path = PathBuf::from(request.output_template.replace("%(ext)s", suffix));
                std::fs::write(&path, b"partial").unwrap();
                Err(BackendError::Upstream(message))
            }
            Outcome::Panic => panic!("muxer crashed"),
        }
    }
}

pub fn video(id: &str, height: u32, ext: &str, acodec: &str) -> StreamDescriptor {
    StreamDescriptor {
        format_id: id.to_string(),
        ext: Some(ext.to_string()),
        width: Some(height * 16 / 9),
        height: Some(height),
        fps: Some(30.0),
        vcodec: Some("avc1.640028".to_string()),
        acodec: Some(acodec.to_string()),
        ..Default::default()
    }
}

pub fn audio(id: &str, abr: f64, ext: &str) -> StreamDescriptor {
    StreamDescriptor {
        format_id: id.to_string(),
        ext: Some(ext.to_string()),
        abr: Some(abr),
        vcodec: Some("none".to_string()),
        acodec: Some("opus".to_string()),
        ..Default::default()
    }
}

pub fn sample_metadata(formats: Vec<StreamDescriptor>) -> MediaMetadata {
    MediaMetadata {
        title: Some("Sample Video".to_string()),
        thumbnail: Some("https://i.example.com/sample.jpg".to_string()),
        duration: Some(212.0),
        uploader: None,
        channel: Some("Sample Channel".to_string()),
        description: Some("A sample".to_string()),
        formats,
    }
}
