use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::error::TwillError;
use crate::server::{AppContext, ApiError};

/// Content types accepted for recording uploads
const UPLOAD_TYPES: [&str; 2] = ["video/webm", "video/mp4"];

pub fn api_routes(ctx: &AppContext) -> Router<AppContext> {
    // Multipart framing adds a little on top of the file itself
    let body_limit = ctx.config.server.max_upload_bytes.saturating_add(64 * 1024);

    Router::new()
        .route("/health", get(health))
        .route("/check-ytdlp", get(check_ytdlp))
        .route("/download", post(download))
        .route(
            "/upload",
            post(upload).layer(DefaultBodyLimit::max(body_limit)),
        )
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn check_ytdlp(State(ctx): State<AppContext>) -> Json<serde_json::Value> {
    let installed = ctx.downloader.check_availability().await;
    Json(json!({ "installed": installed }))
}

#[derive(Deserialize)]
struct DownloadRequest {
    url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    pub success: bool,
    pub url: String,
    pub filename: String,
}

async fn download(
    State(ctx): State<AppContext>,
    Json(payload): Json<DownloadRequest>,
) -> Result<Json<DownloadResponse>, ApiError> {
    let url = payload
        .url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::bad_request("URL is required"))?;

    download_and_store(&ctx, &url).await.map(Json)
}

/// Fetch `url` with the downloader, push the file to the store, and drop the
/// local copy.
pub(crate) async fn download_and_store(
    ctx: &AppContext,
    url: &str,
) -> Result<DownloadResponse, ApiError> {
    if !ctx.downloader.check_availability().await {
        return Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "yt-dlp not installed",
            "Please install yt-dlp (https://github.com/yt-dlp/yt-dlp#installation)",
        ));
    }
    let store = ctx.store()?;

    let failed = |e: TwillError| {
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to download and upload video",
            e.to_string(),
        )
    };

    let temp_root = &ctx.config.server.temp_dir;
    tokio::fs::create_dir_all(temp_root)
        .await
        .map_err(|e| failed(e.into()))?;
    let scratch = tempfile::Builder::new()
        .prefix("download-")
        .tempdir_in(temp_root)
        .map_err(|e| failed(e.into()))?;

    let video_path = ctx
        .downloader
        .download(url, scratch.path())
        .await
        .map_err(failed)?;
    let filename = video_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "video.mp4".to_string());

    let stored = store
        .upload_file(&video_path, &filename)
        .await
        .map_err(failed)?;

    if let Err(e) = tokio::fs::remove_file(&video_path).await {
        warn!("Failed to remove {}: {}", video_path.display(), e);
    }

    info!("Stored {} as {}", url, stored.url);
    Ok(DownloadResponse {
        success: true,
        url: stored.url,
        filename,
    })
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    success: bool,
    url: String,
    filename: String,
    size: u64,
}

async fn upload(
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let store = ctx.store()?;
    let max_bytes = ctx.config.server.max_upload_bytes;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart request: {}", e)))?
    {
        if field.name() != Some("video") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !UPLOAD_TYPES.contains(&content_type.as_str()) {
            return Err(TwillError::UnsupportedFormat(format!(
                "'{}', only webm and mp4 video is accepted",
                content_type
            ))
            .into());
        }

        let filename = field
            .file_name()
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!("recording-{}.webm", chrono::Utc::now().timestamp_millis())
            });

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;

        if data.len() > max_bytes {
            return Err(ApiError::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                "File too large",
                format!("Maximum upload size is {} MB", max_bytes / 1024 / 1024),
            ));
        }

        let stored = store
            .upload_bytes(data.to_vec(), &filename)
            .await
            .map_err(|e| {
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to upload video",
                    e.to_string(),
                )
            })?;

        return Ok(Json(UploadResponse {
            success: true,
            url: stored.url,
            filename,
            size: stored.size,
        }));
    }

    Err(ApiError::bad_request("No file uploaded"))
}
