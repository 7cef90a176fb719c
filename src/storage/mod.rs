// S3-compatible object storage for recordings and downloaded clips
//
// - S3: presigned PUT uploads (rusty-s3 signing, reqwest transport)

pub mod s3;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use s3::*;

use crate::config::StorageConfig;
use crate::error::Result;

/// Object written to the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
    pub size: u64,
}

/// Main trait for object storage operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStoreTrait: Send + Sync {
    /// Upload a local file under a key derived from `file_name`
    async fn upload_file(&self, path: &Path, file_name: &str) -> Result<StoredObject>;

    /// Upload an in-memory blob under a key derived from `file_name`
    async fn upload_bytes(&self, bytes: Vec<u8>, file_name: &str) -> Result<StoredObject>;
}

/// Factory for creating object store instances
pub struct StorageFactory;

impl StorageFactory {
    /// Create the default store implementation (S3-compatible)
    pub fn create_store(config: StorageConfig) -> Result<Box<dyn ObjectStoreTrait>> {
        Ok(Box::new(S3ObjectStore::new(config)?))
    }
}

/// Content type for an uploaded video, by file extension
pub fn video_content_type(file_name: &str) -> &'static str {
    match Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("mp4") => "video/mp4",
        _ => "video/webm",
    }
}

/// Object key for `file_name` uploaded at `timestamp_ms`.
///
/// Only the final path component of `file_name` is kept.
pub fn object_key(prefix: &str, file_name: &str, timestamp_ms: i64) -> String {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("upload.webm");
    let prefix = prefix.trim_matches('/');

    if prefix.is_empty() {
        format!("{}-{}", timestamp_ms, base)
    } else {
        format!("{}/{}-{}", prefix, timestamp_ms, base)
    }
}
