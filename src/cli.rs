use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::wall::Layout;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify video URLs as YouTube, Twitch or Kick references
    Classify {
        /// URLs to classify
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Drive a video wall interactively from stdin
    Session {
        /// Grid layout (defaults to the configured one)
        #[arg(short, long, value_enum)]
        layout: Option<LayoutArg>,
    },

    /// Run the backend proxy server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to bind
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Download a video with yt-dlp
    Download {
        /// Video URL
        url: String,

        /// Directory to save into
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Upload the file to storage and delete the local copy
        #[arg(long)]
        upload: bool,
    },

    /// Upload a recording or clip to storage
    Upload {
        /// File to upload
        file: PathBuf,

        /// Name to store the file under (defaults to the file name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Check whether yt-dlp is installed
    CheckYtdlp,

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LayoutArg {
    /// Four slots
    Quad,
    /// Eight slots
    Stage,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Quad => Layout::Quad,
            LayoutArg::Stage => Layout::Stage,
        }
    }
}
