use std::path::Path;
use tokio::process::Command;
use tracing::{debug, error};

use crate::error::{Result, TwillError};

/// Abstract downloader command representation
#[derive(Debug, Clone)]
pub struct DownloadCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

/// Captured result of a finished command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl DownloadCommand {
    /// Create a new downloader command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Select the download format
    pub fn format<S: Into<String>>(self, format: S) -> Self {
        self.arg("-f").arg(format)
    }

    /// Only fetch the single video even when the URL names a playlist
    pub fn no_playlist(self) -> Self {
        self.arg("--no-playlist")
    }

    /// Set the output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("--output").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Execute the command, failing on a non-zero exit status
    pub async fn execute(&self) -> Result<CommandOutput> {
        debug!("Executing downloader command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| TwillError::Downloader(format!("Failed to execute {}: {}", self.binary_path, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            error!("{} failed: {}", self.description, stderr.trim());
            return Err(TwillError::Downloader(format!(
                "{} failed: {}",
                self.description,
                stderr.trim()
            )));
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

/// Builder for yt-dlp invocations
pub struct DownloadCommandBuilder {
    binary_path: String,
}

impl DownloadCommandBuilder {
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Build single-video download command
    pub fn download<P: AsRef<Path>>(&self, url: &str, output_path: P, format: &str) -> DownloadCommand {
        DownloadCommand::new(&self.binary_path, "Video download")
            .format(format)
            .no_playlist()
            .output(output_path)
            .arg(url)
    }

    /// Build version check command
    pub fn version_check(&self) -> DownloadCommand {
        DownloadCommand::new(&self.binary_path, "Version check").arg("--version")
    }
}
