pub mod api;
pub mod cli;
pub mod config;
pub mod downloader;
pub mod panel;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use api::AppState;
use cli::{Cli, Commands};
use config::AppConfig;
use downloader::{MediaBackend, NetworkOptions, Resolver, YtDlpCli};
use panel::{resolve_save_dir, ConsoleSink, DownloadPanel, PanelOptions};

/// Network options shared by every yt-dlp call
fn network_options(cfg: &AppConfig) -> NetworkOptions {
    NetworkOptions::default().with_socket_timeout(Some(cfg.socket_timeout_secs))
}

fn build_backend(cfg: &AppConfig) -> Arc<dyn MediaBackend> {
    let backend = YtDlpCli::new(
        cfg.ytdlp_path.as_deref(),
        network_options(cfg),
        cfg.process_timeout_secs,
    );
    info!(ytdlp = backend.ytdlp_path(), "using yt-dlp");
    Arc::new(backend)
}

pub async fn run(cli: Cli, cfg: AppConfig) -> Result<()> {
    let backend = build_backend(&cfg);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let state = AppState::new(backend, cfg.temp_dir.clone(), network_options(&cfg));
            api::serve(&cfg, state).await
        }
        Commands::Info { url } => {
            let catalog = Resolver::new(backend).resolve(&url).await?;
            println!("{}", serde_json::to_string_pretty(&catalog)?);
            Ok(())
        }
        Commands::Download {
            url,
            format,
            res,
            fps,
            save_dir,
        } => {
            let options = PanelOptions::new(format, res, fps)?;
            let save_dir = resolve_save_dir(save_dir.or(cfg.save_dir.clone()));
            let panel = DownloadPanel::new(
                backend,
                Arc::new(ConsoleSink),
                save_dir,
                network_options(&cfg),
            );
            let task = panel.on_download_click(&url, options)?;
            let path = task.await?.with_context(|| format!("Download failed for {url}"))?;
            info!(path = %path.display(), "saved");
            Ok(())
        }
    }
}
