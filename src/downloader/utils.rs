// Helper functions for running yt-dlp

use std::process::Stdio;
use std::process::Command as StdCommand;
use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::errors::BackendError;
use super::models::NetworkOptions;

/// Run command with timeout; the child is killed when the limit is hit
pub async fn run_output_with_timeout(
    program: &str,
    args: Vec<String>,
    timeout_secs: u64,
) -> Result<std::process::Output, BackendError> {
    debug!(program, ?args, "spawning");

    let mut child = TokioCommand::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| BackendError::ToolNotFound(format!("Failed to start {}: {}", program, e)))?;

    let mut stdout_pipe = child.stdout.take().ok_or_else(|| {
        BackendError::ExecutionError(format!("Failed to capture stdout from {}", program))
    })?;
    let mut stderr_pipe = child.stderr.take().ok_or_else(|| {
        BackendError::ExecutionError(format!("Failed to capture stderr from {}", program))
    })?;

    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });

    match timeout(Duration::from_secs(timeout_secs), child.wait()).await {
        Ok(status_res) => {
            let status = status_res.map_err(|e| {
                BackendError::ExecutionError(format!("Failed to wait for {}: {}", program, e))
            })?;
            let stdout = join_pipe(stdout_task, "stdout").await?;
            let stderr = join_pipe(stderr_task, "stderr").await?;
            Ok(std::process::Output { status, stdout, stderr })
        }
        Err(_) => {
            let _ = child.kill().await;
            stdout_task.abort();
            stderr_task.abort();
            Err(BackendError::Timeout(timeout_secs))
        }
    }
}

async fn join_pipe(
    task: tokio::task::JoinHandle<std::io::Result<Vec<u8>>>,
    name: &str,
) -> Result<Vec<u8>, BackendError> {
    task.await
        .map_err(|e| BackendError::ExecutionError(format!("{} task failed: {}", name, e)))?
        .map_err(|e| BackendError::ExecutionError(format!("Failed to read {}: {}", name, e)))
}

/// Find yt-dlp executable: explicit override, common install paths, then PATH
pub fn find_ytdlp(explicit: Option<&str>) -> String {
    if let Some(path) = explicit.filter(|p| !p.trim().is_empty()) {
        return path.to_string();
    }

    let common_paths = [
        "/opt/homebrew/bin/yt-dlp", // Homebrew on Apple Silicon
        "/usr/local/bin/yt-dlp",    // Homebrew on Intel Mac
        "/usr/bin/yt-dlp",          // System installation
    ];

    for path in common_paths {
        if std::path::Path::new(path).exists() {
            return path.to_string();
        }
    }

    if let Ok(output) = StdCommand::new("which").arg("yt-dlp").output() {
        if output.status.success() {
            if let Ok(path) = String::from_utf8(output.stdout) {
                let trimmed = path.trim();
                if !trimmed.is_empty() {
                    return trimmed.to_string();
                }
            }
        }
    }

    // Last resort: hope it's in PATH
    "yt-dlp".to_string()
}

/// Build network arguments for yt-dlp
pub fn network_args(options: &NetworkOptions) -> Vec<String> {
    let mut args = Vec::new();

    if options.no_check_certificate {
        args.push("--no-check-certificates".to_string());
    }
    if options.geo_bypass {
        args.push("--geo-bypass".to_string());
    }
    if options.retries > 0 {
        args.push("--retries".to_string());
        args.push(options.retries.to_string());
    }
    if options.fragment_retries > 0 {
        args.push("--fragment-retries".to_string());
        args.push(options.fragment_retries.to_string());
    }
    if let Some(chunk) = options.http_chunk_size {
        args.push("--http-chunk-size".to_string());
        args.push(chunk.to_string());
    }
    if let Some(seconds) = options.socket_timeout {
        args.push("--socket-timeout".to_string());
        args.push(seconds.to_string());
    }

    args.push("--user-agent".to_string());
    args.push(options.user_agent.clone());

    for (name, value) in &options.headers {
        args.push("--add-header".to_string());
        args.push(format!("{}:{}", name, value));
    }

    args
}
