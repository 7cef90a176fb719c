use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::config::DownloaderConfig;
use crate::error::{Result, TwillError};
use super::{DownloadCommandBuilder, VideoDownloaderTrait};

/// yt-dlp backed downloader
pub struct YtDlpDownloader {
    config: DownloaderConfig,
    command_builder: DownloadCommandBuilder,
}

impl YtDlpDownloader {
    pub fn new(config: DownloaderConfig) -> Self {
        let command_builder = DownloadCommandBuilder::new(&config.binary_path);

        Self {
            config,
            command_builder,
        }
    }
}

/// File name for a download started at `timestamp_ms`
pub fn download_file_name(timestamp_ms: i64) -> String {
    format!("video-{}.mp4", timestamp_ms)
}

#[async_trait]
impl VideoDownloaderTrait for YtDlpDownloader {
    async fn download(&self, url: &str, out_dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(out_dir).await?;

        let output_path = out_dir.join(download_file_name(chrono::Utc::now().timestamp_millis()));
        info!("Downloading {} to {}", url, output_path.display());

        let command = self
            .command_builder
            .download(url, &output_path, &self.config.format);
        let output = command.execute().await?;

        // yt-dlp reports progress and warnings on stderr; only surface the rest
        if !output.stderr.is_empty() && !output.stderr.contains("WARNING") {
            error!("yt-dlp stderr: {}", output.stderr.trim());
        }
        debug!("yt-dlp stdout: {}", output.stdout.trim());

        if !output_path.exists() {
            return Err(TwillError::Downloader("Video file was not created".to_string()));
        }

        info!("Download completed: {}", output_path.display());
        Ok(output_path)
    }

    async fn check_availability(&self) -> bool {
        match self.version().await {
            Ok(version) => {
                debug!("yt-dlp {} is available", version);
                true
            }
            Err(e) => {
                debug!("yt-dlp is not available: {}", e);
                false
            }
        }
    }

    async fn version(&self) -> Result<String> {
        let output = self.command_builder.version_check().execute().await?;
        Ok(output
            .stdout
            .lines()
            .next()
            .unwrap_or("Unknown version")
            .trim()
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_binary() -> YtDlpDownloader {
        YtDlpDownloader::new(DownloaderConfig {
            binary_path: "/nonexistent/yt-dlp-binary".to_string(),
            ..DownloaderConfig::default()
        })
    }

    #[test]
    fn test_download_file_name() {
        assert_eq!(download_file_name(1700000000123), "video-1700000000123.mp4");
    }

    #[tokio::test]
    async fn test_unavailable_binary() {
        let downloader = missing_binary();
        assert!(!downloader.check_availability().await);
        assert!(downloader.version().await.is_err());
    }

    #[tokio::test]
    async fn test_download_with_missing_binary_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = missing_binary()
            .download("https://kick.com/somestreamer", dir.path())
            .await;
        assert!(matches!(result, Err(TwillError::Downloader(_))));
    }
}
