//! Command line argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::panel::Container;

/// Video downloader - HTTP API and download panel over yt-dlp
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Run the HTTP API (default; port from PORT, default 5000)
    Serve,

    /// Print the normalized format catalog for a URL as JSON
    Info {
        url: String,
    },

    /// Download one URL into the save folder, like the panel's download button
    Download {
        url: String,

        /// Output container; mp3 extracts audio
        #[arg(short, long, value_enum, default_value = "mp4")]
        format: Container,

        /// Maximum height (2160, 1080, 720, 480)
        #[arg(long, default_value = "1080")]
        res: u32,

        /// Maximum frame rate (60, 50, 30, 24)
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Save folder (defaults to SAVE_DIR, then the Download folder)
        #[arg(long, value_name = "DIR")]
        save_dir: Option<PathBuf>,
    },
}
