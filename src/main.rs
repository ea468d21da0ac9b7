use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use video_downloader::cli::Cli;
use video_downloader::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = AppConfig::from_env()?;

    video_downloader::run(cli, cfg).await
}
