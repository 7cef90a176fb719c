use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::classify::{classify, ParsedVideo};
use crate::server::routes_api::{download_and_store, DownloadResponse};
use crate::server::{ApiError, AppContext};
use crate::session::toggle_audio_selection;
use crate::wall::WallSnapshot;

pub fn wall_routes() -> Router<AppContext> {
    Router::new()
        .route("/wall", get(get_wall))
        .route("/wall/videos", post(add_video))
        .route("/wall/slots/:id", delete(clear_slot))
        .route("/wall/slots/:id/select", post(select_slot))
        .route("/wall/slots/:id/download", post(download_slot))
        .route("/wall/swap", post(swap_slots))
        .route("/wall/audio", put(set_audio))
        .route("/wall/mute-all", post(toggle_mute_all))
}

async fn get_wall(State(ctx): State<AppContext>) -> Json<WallSnapshot> {
    Json(ctx.wall.lock().await.snapshot())
}

#[derive(Deserialize)]
struct AddVideoRequest {
    url: String,
}

#[derive(Serialize)]
struct AddVideoResponse {
    slot: usize,
    video: ParsedVideo,
    wall: WallSnapshot,
}

async fn add_video(
    State(ctx): State<AppContext>,
    Json(payload): Json<AddVideoRequest>,
) -> Result<(StatusCode, Json<AddVideoResponse>), ApiError> {
    let video = classify(&payload.url)?;

    let mut wall = ctx.wall.lock().await;
    let slot = wall.add_parsed(&video)?;

    Ok((
        StatusCode::CREATED,
        Json(AddVideoResponse {
            slot,
            video,
            wall: wall.snapshot(),
        }),
    ))
}

async fn clear_slot(
    State(ctx): State<AppContext>,
    Path(id): Path<usize>,
) -> Result<Json<WallSnapshot>, ApiError> {
    let mut wall = ctx.wall.lock().await;
    wall.clear(id)?;
    Ok(Json(wall.snapshot()))
}

async fn select_slot(
    State(ctx): State<AppContext>,
    Path(id): Path<usize>,
) -> Result<Json<WallSnapshot>, ApiError> {
    let mut wall = ctx.wall.lock().await;
    toggle_audio_selection(&mut wall, id)?;
    Ok(Json(wall.snapshot()))
}

#[derive(Deserialize)]
struct SwapRequest {
    from: usize,
    to: usize,
}

async fn swap_slots(
    State(ctx): State<AppContext>,
    Json(payload): Json<SwapRequest>,
) -> Result<Json<WallSnapshot>, ApiError> {
    let mut wall = ctx.wall.lock().await;
    wall.swap(payload.from, payload.to)?;
    Ok(Json(wall.snapshot()))
}

#[derive(Deserialize)]
struct AudioRequest {
    slot: Option<usize>,
}

async fn set_audio(
    State(ctx): State<AppContext>,
    Json(payload): Json<AudioRequest>,
) -> Result<Json<WallSnapshot>, ApiError> {
    let mut wall = ctx.wall.lock().await;
    wall.set_active_audio_slot(payload.slot)?;
    Ok(Json(wall.snapshot()))
}

async fn toggle_mute_all(State(ctx): State<AppContext>) -> Json<WallSnapshot> {
    let mut wall = ctx.wall.lock().await;
    wall.toggle_mute_all();
    Json(wall.snapshot())
}

async fn download_slot(
    State(ctx): State<AppContext>,
    Path(id): Path<usize>,
) -> Result<Json<DownloadResponse>, ApiError> {
    // Release the wall before the slow part
    let url = {
        let wall = ctx.wall.lock().await;
        let video = wall
            .slot(id)?
            .video
            .clone()
            .ok_or_else(|| ApiError::bad_request(format!("Slot {} is empty", id + 1)))?;
        video.source_url()
    };

    download_and_store(&ctx, &url).await.map(Json)
}
