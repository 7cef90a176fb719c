//! Backend proxy: health, yt-dlp download-and-store, recording upload, and
//! the video wall re-hosted behind HTTP.

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::Mutex;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::downloader::{purge_stale, DownloaderFactory, VideoDownloaderTrait};
use crate::error::TwillError;
use crate::storage::{ObjectStoreTrait, StorageFactory};
use crate::wall::VideoWall;

pub mod routes_api;
pub mod routes_wall;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    /// All wall operations go through this lock, one at a time
    pub wall: Arc<Mutex<VideoWall>>,
    pub downloader: Arc<dyn VideoDownloaderTrait>,
    /// Absent when storage credentials are not configured
    pub store: Option<Arc<dyn ObjectStoreTrait>>,
}

impl AppContext {
    pub fn new(
        config: Config,
        downloader: Arc<dyn VideoDownloaderTrait>,
        store: Option<Arc<dyn ObjectStoreTrait>>,
    ) -> Self {
        let wall = VideoWall::new(config.wall.layout);
        Self {
            config: Arc::new(config),
            wall: Arc::new(Mutex::new(wall)),
            downloader,
            store,
        }
    }

    /// Build the context with the default downloader and store
    pub fn from_config(config: Config) -> Self {
        let downloader: Arc<dyn VideoDownloaderTrait> =
            Arc::from(DownloaderFactory::create_downloader(config.downloader.clone()));

        let store = match StorageFactory::create_store(config.storage.clone()) {
            Ok(store) => Some(Arc::from(store)),
            Err(e) => {
                warn!("Uploads disabled: {}", e);
                None
            }
        };

        Self::new(config, downloader, store)
    }

    pub(crate) fn store(&self) -> std::result::Result<Arc<dyn ObjectStoreTrait>, ApiError> {
        self.store.clone().ok_or_else(|| {
            ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "Storage is not configured",
                "Set the storage section or the B2_* environment variables",
            )
        })
    }
}

/// JSON error response: `{success: false, error, message}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub message: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            message: Some(message.into()),
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: error.into(),
            message: None,
        }
    }
}

impl From<TwillError> for ApiError {
    fn from(e: TwillError) -> Self {
        let status = match &e {
            TwillError::InvalidUrl(_)
            | TwillError::InvalidSlot { .. }
            | TwillError::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,
            TwillError::CapacityExhausted { .. } => StatusCode::CONFLICT,
            TwillError::FileNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            error: e.to_string(),
            message: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("{}: {}", self.error, self.message.as_deref().unwrap_or_default());
        }
        let body = match self.message {
            Some(message) => json!({ "success": false, "error": self.error, "message": message }),
            None => json!({ "success": false, "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let origins: Vec<HeaderValue> = ctx
        .config
        .server
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let api = routes_api::api_routes(&ctx).merge(routes_wall::wall_routes());

    Router::new()
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    tokio::fs::create_dir_all(&config.server.temp_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.server.temp_dir.display()))?;
    purge_stale(&config.server.temp_dir, Duration::from_secs(24 * 60 * 60))?;

    let ctx = AppContext::from_config(config);
    info!(
        "Wall has {} slots; uploads {}",
        ctx.config.wall.layout.slot_count(),
        if ctx.store.is_some() { "enabled" } else { "disabled" }
    );
    if ctx.store.is_some() {
        info!(
            "Bucket: {} at {}",
            ctx.config.storage.bucket, ctx.config.storage.endpoint
        );
    }

    let app = create_router(ctx);

    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::downloader::MockVideoDownloaderTrait;

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let ctx = context(Config::default(), MockVideoDownloaderTrait::new(), None);
        let request = axum::http::Request::builder()
            .method("OPTIONS")
            .uri("/api/health")
            .header("origin", "http://localhost:5173")
            .header("access-control-request-method", "GET")
            .body(axum::body::Body::empty())
            .unwrap();

        let response = tower::ServiceExt::oneshot(create_router(ctx), request).await.unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(
            response.headers().get("access-control-allow-credentials").unwrap(),
            "true"
        );
    }

    #[test]
    fn test_error_status_mapping() {
        let status = |e: TwillError| ApiError::from(e).status;
        assert_eq!(status(TwillError::InvalidUrl("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(TwillError::InvalidSlot { slot: 9, capacity: 8 }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status(TwillError::CapacityExhausted { capacity: 8 }), StatusCode::CONFLICT);
        assert_eq!(
            status(TwillError::Storage("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
