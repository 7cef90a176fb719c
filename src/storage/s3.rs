use async_trait::async_trait;
use reqwest::Client;
use rusty_s3::{Bucket, Credentials, S3Action, UrlStyle};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::config::StorageConfig;
use crate::error::{Result, TwillError};
use super::{object_key, video_content_type, ObjectStoreTrait, StoredObject};

/// Object store speaking the S3 API with path-style addressing
pub struct S3ObjectStore {
    client: Client,
    bucket: Bucket,
    credentials: Credentials,
    key_prefix: String,
    presign_ttl: Duration,
}

impl S3ObjectStore {
    pub fn new(config: StorageConfig) -> Result<Self> {
        for (name, value) in [
            ("endpoint", &config.endpoint),
            ("bucket", &config.bucket),
            ("key_id", &config.key_id),
            ("application_key", &config.application_key),
        ] {
            if value.trim().is_empty() {
                return Err(TwillError::Config(format!("storage.{} is not set", name)));
            }
        }

        let endpoint = endpoint_url(&config.endpoint)?;
        let bucket = Bucket::new(endpoint, UrlStyle::Path, config.bucket.clone(), config.region.clone())
            .map_err(|e| TwillError::Config(format!("Invalid storage bucket: {}", e)))?;
        let credentials = Credentials::new(config.key_id.clone(), config.application_key.clone());

        let client = Client::builder()
            .user_agent(concat!("twill/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(TwillError::Http)?;

        Ok(Self {
            client,
            bucket,
            credentials,
            key_prefix: config.key_prefix,
            presign_ttl: Duration::from_secs(config.presign_ttl_secs),
        })
    }

    async fn put(&self, body: Vec<u8>, file_name: &str) -> Result<StoredObject> {
        let key = object_key(&self.key_prefix, file_name, chrono::Utc::now().timestamp_millis());
        let size = body.len() as u64;

        let signed_url = self
            .bucket
            .put_object(Some(&self.credentials), &key)
            .sign(self.presign_ttl);
        debug!("Uploading {} bytes to {}/{}", size, self.bucket.name(), key);

        let response = self
            .client
            .put(signed_url)
            .header(reqwest::header::CONTENT_TYPE, video_content_type(file_name))
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(TwillError::Storage(format!(
                "Upload of {} failed with {}: {}",
                key,
                status,
                text.trim()
            )));
        }

        let url = self
            .bucket
            .object_url(&key)
            .map_err(|e| TwillError::Storage(format!("Failed to build object URL: {}", e)))?;

        info!("Uploaded {} ({} bytes)", url, size);
        Ok(StoredObject {
            key,
            url: url.to_string(),
            size,
        })
    }
}

/// Endpoints are usually configured as a bare host; assume https then
fn endpoint_url(endpoint: &str) -> Result<Url> {
    let endpoint = endpoint.trim().trim_end_matches('/');
    let with_scheme = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("https://{}", endpoint)
    };

    Url::parse(&with_scheme)
        .map_err(|e| TwillError::Config(format!("Invalid storage endpoint '{}': {}", endpoint, e)))
}

#[async_trait]
impl ObjectStoreTrait for S3ObjectStore {
    async fn upload_file(&self, path: &Path, file_name: &str) -> Result<StoredObject> {
        if !path.exists() {
            return Err(TwillError::FileNotFound(path.display().to_string()));
        }
        let body = tokio::fs::read(path).await?;
        self.put(body, file_name).await
    }

    async fn upload_bytes(&self, bytes: Vec<u8>, file_name: &str) -> Result<StoredObject> {
        self.put(bytes, file_name).await
    }
}
