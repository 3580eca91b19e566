use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{AppError, AppState};
use crate::cache::CacheMetrics;
use crate::sources::Metadata;
use crate::storage::{AddOutcome, Playlist, SongRecord};

#[derive(Debug, Deserialize)]
pub struct StreamParams {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpNextParams {
    pub video_id: String,
}

#[derive(Debug, Serialize)]
pub struct UpNextResponse {
    pub upnext: Vec<Metadata>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistBody {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddSongBody {
    pub playlist_id: u64,
    #[serde(rename = "videoId")]
    pub video_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveSongBody {
    pub playlist_id: u64,
    #[serde(rename = "videoId")]
    pub video_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DeletePlaylistParams {
    pub playlist_id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeParams {
    pub video_id: String,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub thumbnail: String,
}

#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    pub stream: CacheMetrics,
    pub upnext: CacheMetrics,
}

// ============ Core ============

pub async fn stream(State(state): State<AppState>, Query(params): Query<StreamParams>) -> Json<Value> {
    match state.streams.resolve(&params.url).await {
        Some(url) => Json(json!({ "url": url })),
        None => Json(json!({ "error": "Stream not found" })),
    }
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Metadata>> {
    Json(state.search.search(&params.q).await)
}

pub async fn upnext(
    State(state): State<AppState>,
    Query(params): Query<UpNextParams>,
) -> Json<UpNextResponse> {
    let upnext = state.upnext.build_up_next(&params.video_id).await;
    Json(UpNextResponse { upnext })
}

// ============ Playlists ============

pub async fn list_playlists(State(state): State<AppState>) -> Json<Value> {
    let library = state.library.lock().await;
    Json(json!({ "playlists": library.playlists() }))
}

pub async fn create_playlist(
    State(state): State<AppState>,
    Json(body): Json<CreatePlaylistBody>,
) -> Result<Json<Value>, AppError> {
    let playlist: Playlist = state.library.lock().await.create_playlist(&body.name).await?;
    Ok(Json(json!({ "id": playlist.id, "playlist": playlist })))
}

pub async fn add_to_playlist(
    State(state): State<AppState>,
    Json(body): Json<AddSongBody>,
) -> Result<Json<Value>, AppError> {
    let song = SongRecord {
        title: body.title,
        artist: body.artist,
        thumbnail: body.thumbnail,
        ..SongRecord::new(body.video_id)
    };

    let outcome = state.library.lock().await.add_song(body.playlist_id, song).await?;
    let message = match outcome {
        AddOutcome::Added => "Song added",
        AddOutcome::AlreadyPresent => "Already added",
    };
    Ok(Json(json!({ "message": message })))
}

pub async fn remove_from_playlist(
    State(state): State<AppState>,
    Json(body): Json<RemoveSongBody>,
) -> Result<Json<Value>, AppError> {
    let removed = state
        .library
        .lock()
        .await
        .remove_song(body.playlist_id, &body.video_id)
        .await?;

    let message = if removed { "Song removed" } else { "Song not in playlist" };
    Ok(Json(json!({ "message": message })))
}

pub async fn delete_playlist(
    State(state): State<AppState>,
    Query(params): Query<DeletePlaylistParams>,
) -> Result<Json<Value>, AppError> {
    state.library.lock().await.delete_playlist(params.playlist_id).await?;
    Ok(Json(json!({ "message": "Deleted" })))
}

// ============ Favoritos ============

pub async fn toggle_like(
    State(state): State<AppState>,
    Query(params): Query<LikeParams>,
) -> Result<Json<Value>, AppError> {
    let song = SongRecord {
        title: Some(params.title),
        artist: Some(params.artist),
        thumbnail: Some(params.thumbnail),
        ..SongRecord::new(params.video_id)
    };

    let liked = state.library.lock().await.toggle_like(song).await?;
    let message = if liked { "Song liked" } else { "Song unliked" };
    Ok(Json(json!({ "liked": liked, "message": message })))
}

pub async fn list_liked(State(state): State<AppState>) -> Json<Value> {
    let library = state.library.lock().await;
    Json(json!({ "liked": library.liked() }))
}

// ============ Servicio ============

pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    Json(CacheStatsResponse {
        stream: state.streams.cache().metrics(),
        upnext: state.upnext.cache().metrics(),
    })
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
