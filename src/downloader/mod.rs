// External video downloader
//
// Downloads run through an external binary (yt-dlp) behind a trait so the
// backend proxy can be exercised without one installed:
// - Commands: command builder executed through tokio::process
// - YtDlp: yt-dlp implementation

pub mod commands;
pub mod ytdlp;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub use commands::*;
pub use ytdlp::*;

use crate::config::DownloaderConfig;
use crate::error::{Result, TwillError};

/// Main trait for downloading remote videos to local files
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoDownloaderTrait: Send + Sync {
    /// Download the video behind `url` into `out_dir` and return the file path
    async fn download(&self, url: &str, out_dir: &Path) -> Result<PathBuf>;

    /// Whether the downloader binary can be executed
    async fn check_availability(&self) -> bool;

    /// Downloader version string
    async fn version(&self) -> Result<String>;
}

/// Factory for creating downloader instances
pub struct DownloaderFactory;

impl DownloaderFactory {
    /// Create the default downloader implementation (yt-dlp based)
    pub fn create_downloader(config: DownloaderConfig) -> Box<dyn VideoDownloaderTrait> {
        Box::new(YtDlpDownloader::new(config))
    }
}

/// Version of the installed downloader, or a `Downloader` error naming why
/// it could not be run
pub async fn installed_version(downloader: &dyn VideoDownloaderTrait) -> Result<String> {
    downloader
        .version()
        .await
        .map_err(|e| TwillError::Downloader(format!("yt-dlp is not installed: {}", e)))
}

/// Remove files under `dir` last modified more than `max_age` ago.
///
/// Downloads are deleted once uploaded; this sweeps whatever an interrupted
/// run left behind. Returns the number of files removed.
pub fn purge_stale<P: AsRef<Path>>(dir: P, max_age: Duration) -> Result<u64> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(0);
    }

    let now = SystemTime::now();
    let mut removed = 0;

    for entry in WalkDir::new(dir).min_depth(1).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }

        let modified = match entry.metadata().ok().and_then(|m| m.modified().ok()) {
            Some(modified) => modified,
            None => continue,
        };

        let age = now.duration_since(modified).unwrap_or_default();
        if age < max_age {
            continue;
        }

        match std::fs::remove_file(entry.path()) {
            Ok(()) => {
                debug!("Removed stale download {}", entry.path().display());
                removed += 1;
            }
            Err(e) => warn!("Failed to remove {}: {}", entry.path().display(), e),
        }
    }

    if removed > 0 {
        info!("Purged {} stale files from {}", removed, dir.display());
    }
    Ok(removed)
}
