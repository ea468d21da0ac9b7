// Error types for the extraction backend, the resolver and the fetcher

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Failure reported by a `MediaBackend` implementation
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// yt-dlp binary could not be started
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// The external process ran longer than the configured limit
    #[error("Timed out after {0}s")]
    Timeout(u64),

    /// Failed to parse yt-dlp JSON output
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Process plumbing failed (pipes, wait, missing output)
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// yt-dlp itself reported an error; carries its stderr text
    #[error("{0}")]
    Upstream(String),
}

impl From<String> for BackendError {
    fn from(s: String) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Self::Upstream("yt-dlp exited without an error message".to_string());
        }
        // yt-dlp prints warnings before the fatal line; keep the ERROR lines when present
        let errors: Vec<&str> = trimmed
            .lines()
            .filter(|l| l.starts_with("ERROR:"))
            .collect();
        if errors.is_empty() {
            Self::Upstream(trimmed.to_string())
        } else {
            Self::Upstream(errors.join("\n"))
        }
    }
}

/// Metadata for a URL could not be retrieved
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ExtractionError {
    pub message: String,
}

impl ExtractionError {
    pub fn reason(&self) -> FailureReason {
        FailureReason::classify(&self.message)
    }
}

impl From<BackendError> for ExtractionError {
    fn from(e: BackendError) -> Self {
        Self {
            message: e.to_string(),
        }
    }
}

/// Coarse failure taxonomy derived from the tool's error text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    FormatUnavailable,
    AccessDenied,
    NotFound,
    CopyrightBlocked,
    Unknown,
}

lazy_static! {
    static ref FORMAT_RE: Regex = Regex::new(r"(?i)format").unwrap();
    static ref ACCESS_RE: Regex = Regex::new(r"(?i)private|members-only").unwrap();
    static ref NOT_FOUND_RE: Regex = Regex::new(r"(?i)not available").unwrap();
    static ref COPYRIGHT_RE: Regex = Regex::new(r"(?i)copyright").unwrap();
}

impl FailureReason {
    /// Classify an error message. Order matters: the first matching keyword wins.
    pub fn classify(message: &str) -> Self {
        if FORMAT_RE.is_match(message) {
            Self::FormatUnavailable
        } else if ACCESS_RE.is_match(message) {
            Self::AccessDenied
        } else if NOT_FOUND_RE.is_match(message) {
            Self::NotFound
        } else if COPYRIGHT_RE.is_match(message) {
            Self::CopyrightBlocked
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FormatUnavailable => "format_unavailable",
            Self::AccessDenied => "access_denied",
            Self::NotFound => "not_found",
            Self::CopyrightBlocked => "copyright_blocked",
            Self::Unknown => "unknown",
        }
    }
}

/// Terminal failure of `Fetcher::fetch`
#[derive(Debug, Clone, Error)]
#[error("Download failed ({}): {message}", reason.as_str())]
pub struct FetchError {
    pub reason: FailureReason,
    pub message: String,
}

impl FetchError {
    pub fn classified(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            reason: FailureReason::classify(&message),
            message,
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            reason: FailureReason::Unknown,
            message: message.into(),
        }
    }
}
