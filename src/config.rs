use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    /// Explicit yt-dlp binary; located automatically when unset
    pub ytdlp_path: Option<String>,
    /// Where HTTP downloads are materialized before streaming
    pub temp_dir: PathBuf,
    /// Where panel downloads are saved; the user's Download folder when unset
    pub save_dir: Option<PathBuf>,
    pub socket_timeout_secs: u32,
    pub process_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            ytdlp_path: None,
            temp_dir: std::env::temp_dir(),
            save_dir: None,
            socket_timeout_secs: 30,
            process_timeout_secs: 1800,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let port = parse_or("PORT", defaults.port)?;
        let ytdlp_path = optional("YTDLP_PATH");
        let temp_dir = match optional("DOWNLOAD_TEMP_DIR") {
            Some(raw) => absolute(PathBuf::from(raw))?,
            None => defaults.temp_dir,
        };
        let save_dir = optional("SAVE_DIR").map(PathBuf::from);
        let socket_timeout_secs = parse_or("YTDLP_SOCKET_TIMEOUT", defaults.socket_timeout_secs)?;
        let process_timeout_secs = parse_or("YTDLP_PROCESS_TIMEOUT", defaults.process_timeout_secs)?;

        Ok(Self {
            port,
            ytdlp_path,
            temp_dir,
            save_dir,
            socket_timeout_secs,
            process_timeout_secs,
        })
    }

    /// All interfaces on the configured port
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

/// Relative paths are taken from the working directory
fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    Ok(cwd.join(path))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {key}: {raw}")),
        None => Ok(default),
    }
}
