use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, TwillError};
use crate::wall::Layout;

// Default values for fields that older config files may omit
fn default_key_prefix() -> String {
    "recordings".to_string()
}

fn default_presign_ttl_secs() -> u64 {
    3600
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub downloader: DownloaderConfig,
    pub storage: StorageConfig,
    pub wall: WallConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind the backend proxy to
    pub host: String,
    /// Port to bind the backend proxy to
    pub port: u16,
    /// Origins allowed to call the API with credentials
    pub allowed_origins: Vec<String>,
    /// Scratch directory for downloads before they are uploaded
    pub temp_dir: PathBuf,
    /// Largest accepted recording upload, in bytes
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloaderConfig {
    /// Path to the yt-dlp binary
    pub binary_path: String,
    /// yt-dlp format selector
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Host (and optional port) of the S3-compatible endpoint, without scheme
    pub endpoint: String,
    /// Bucket receiving uploads
    pub bucket: String,
    /// Region used for request signing
    pub region: String,
    /// Access key id
    pub key_id: String,
    /// Secret access key
    pub application_key: String,
    /// Prefix prepended to every object key
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Lifetime of presigned upload URLs, in seconds
    #[serde(default = "default_presign_ttl_secs")]
    pub presign_ttl_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    /// Grid layout: quad (4 slots) or stage (8 slots)
    pub layout: Layout,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            allowed_origins: vec!["http://localhost:5173".to_string()],
            temp_dir: PathBuf::from("temp"),
            max_upload_bytes: 500 * 1024 * 1024,
        }
    }
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            binary_path: "yt-dlp".to_string(),
            format: "best[ext=mp4]/best".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            bucket: String::new(),
            region: "us-west-004".to_string(),
            key_id: String::new(),
            application_key: String::new(),
            key_prefix: default_key_prefix(),
            presign_ttl_secs: default_presign_ttl_secs(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TwillError::Config(format!("Failed to read config file: {}", e)))?;

        Ok(toml::from_str(&content)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml()?;

        std::fs::write(path, content)
            .map_err(|e| TwillError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| TwillError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Override storage and server settings from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage = &mut self.storage;
        for (key, field) in [
            ("B2_ENDPOINT", &mut storage.endpoint),
            ("B2_BUCKET_NAME", &mut storage.bucket),
            ("B2_REGION", &mut storage.region),
            ("B2_KEY_ID", &mut storage.key_id),
            ("B2_APPLICATION_KEY", &mut storage.application_key),
        ] {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                debug!("Using {} from environment", key);
                *field = value;
            }
        }

        if let Some(port) = lookup("PORT").filter(|v| !v.is_empty()) {
            self.server.port = port
                .parse()
                .map_err(|_| TwillError::Config(format!("Invalid PORT '{}'", port)))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.server.max_upload_bytes, 500 * 1024 * 1024);
        assert_eq!(config.downloader.binary_path, "yt-dlp");
        assert_eq!(config.storage.key_prefix, "recordings");
        assert_eq!(config.wall.layout, Layout::Stage);
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = assert_fs::TempDir::new().unwrap();
        let path = dir.path().join("twill.toml");

        let mut config = Config::default();
        config.wall.layout = Layout::Quad;
        config.storage.bucket = "clips".to_string();
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.wall.layout, Layout::Quad);
        assert_eq!(loaded.storage.bucket, "clips");
    }

    #[test]
    fn test_missing_optional_storage_fields() {
        let toml = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            allowed_origins = []
            temp_dir = "/tmp/twill"
            max_upload_bytes = 1024

            [downloader]
            binary_path = "/usr/local/bin/yt-dlp"
            format = "best"

            [storage]
            endpoint = "s3.us-west-004.backblazeb2.com"
            bucket = "clips"
            region = "us-west-004"
            key_id = "id"
            application_key = "secret"

            [wall]
            layout = "quad"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.storage.key_prefix, "recordings");
        assert_eq!(config.storage.presign_ttl_secs, 3600);
        assert_eq!(config.wall.layout, Layout::Quad);
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "server = 12").unwrap();
        assert!(matches!(Config::from_file(file.path()), Err(TwillError::Toml(_))));
        assert!(matches!(
            Config::from_file(file.path().with_extension("missing")),
            Err(TwillError::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("B2_ENDPOINT", "s3.example.com"),
            ("B2_BUCKET_NAME", "wall"),
            ("B2_KEY_ID", "key"),
            ("B2_APPLICATION_KEY", ""),
            ("PORT", "4000"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.storage.application_key = "from-file".to_string();
        config
            .apply_vars(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.storage.endpoint, "s3.example.com");
        assert_eq!(config.storage.bucket, "wall");
        assert_eq!(config.storage.key_id, "key");
        assert_eq!(config.storage.application_key, "from-file");
        assert_eq!(config.storage.region, "us-west-004");
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_empty_port_keeps_default() {
        let mut config = Config::default();
        config
            .apply_vars(|key| (key == "PORT").then(String::new))
            .unwrap();
        assert_eq!(config.server.port, 3001);
    }

    #[test]
    fn test_partial_config_file() {
        let toml = r#"
            [storage]
            endpoint = "s3.us-west-004.backblazeb2.com"
            bucket = "clips"

            [server]
            port = 8080
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.storage.bucket, "clips");
        assert_eq!(config.storage.region, "us-west-004");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.downloader.binary_path, "yt-dlp");
        assert_eq!(config.wall.layout, Layout::Stage);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let mut config = Config::default();
        let result = config.apply_vars(|key| (key == "PORT").then(|| "http".to_string()));
        assert!(matches!(result, Err(TwillError::Config(_))));
    }
}
