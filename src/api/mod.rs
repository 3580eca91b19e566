//! # API Module
//!
//! HTTP surface consumed by the Nebula front end.
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET | `/stream?url=` | [`handlers::stream`] |
//! | GET | `/search?q=` | [`handlers::search`] |
//! | GET | `/autoplay/upnext?videoId=` | [`handlers::upnext`] |
//! | GET | `/playlist/all` | [`handlers::list_playlists`] |
//! | POST | `/playlist/create` | [`handlers::create_playlist`] |
//! | POST | `/playlist/add` | [`handlers::add_to_playlist`] |
//! | POST | `/playlist/remove` | [`handlers::remove_from_playlist`] |
//! | DELETE | `/playlist/delete?playlist_id=` | [`handlers::delete_playlist`] |
//! | POST | `/like?videoId=&title=` | [`handlers::toggle_like`] |
//! | GET | `/liked/all` | [`handlers::list_liked`] |
//! | GET | `/cache/stats` | [`handlers::cache_stats`] |
//! | GET | `/health` | [`handlers::health`] |
//!
//! The three core endpoints always answer `200` with a valid body; upstream
//! failures only show up in the logs.

pub mod handlers;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use std::{path::Path, sync::Arc};
use tokio::sync::Mutex;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::autoplay::UpNextEngine;
use crate::sources::SearchFacade;
use crate::storage::{LibraryStore, StorageError};
use crate::stream::StreamResolver;

/// Estado compartido por todos los handlers
#[derive(Clone)]
pub struct AppState {
    pub streams: Arc<StreamResolver>,
    pub search: Arc<SearchFacade>,
    pub upnext: Arc<UpNextEngine>,
    pub library: Arc<Mutex<LibraryStore>>,
}

/// Crea el router con todos los endpoints
pub fn router(state: AppState, frontend_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/stream", get(handlers::stream))
        .route("/search", get(handlers::search))
        .route("/autoplay/upnext", get(handlers::upnext))
        .route("/playlist/all", get(handlers::list_playlists))
        .route("/playlist/create", post(handlers::create_playlist))
        .route("/playlist/add", post(handlers::add_to_playlist))
        .route("/playlist/remove", post(handlers::remove_from_playlist))
        .route("/playlist/delete", delete(handlers::delete_playlist))
        .route("/like", post(handlers::toggle_like))
        .route("/liked/all", get(handlers::list_liked))
        .route("/cache/stats", get(handlers::cache_stats))
        .route("/health", get(handlers::health));

    // Front end compilado: cualquier ruta desconocida sirve index.html
    if let Some(dir) = frontend_dir {
        let index = ServeFile::new(dir.join("index.html"));
        router = router.fallback_service(ServeDir::new(dir).fallback(index));
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Errores de la biblioteca convertidos a `{error}` con su status
#[derive(Debug)]
pub struct AppError(StorageError);

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StorageError::PlaylistNotFound(_) => StatusCode::NOT_FOUND,
            StorageError::EmptyName => StatusCode::BAD_REQUEST,
            StorageError::Io(_) | StorageError::Json(_) => {
                tracing::error!("❌ Error de almacenamiento: {}", self.0);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autoplay::NoShuffle;
    use crate::cache::TtlCache;
    use crate::sources::{ExtractionError, MetadataExtractor, MockMetadataExtractor, VideoInfo};
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request},
    };
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn build_app(extractor: MockMetadataExtractor) -> (Router, TempDir) {
        let dir = TempDir::new().unwrap();
        let extractor: Arc<dyn MetadataExtractor> = Arc::new(extractor);
        let search = Arc::new(SearchFacade::new(extractor.clone(), None, Duration::from_secs(5)));

        let state = AppState {
            streams: Arc::new(StreamResolver::new(
                extractor.clone(),
                TtlCache::with_system_clock(Duration::from_secs(1800)),
                Duration::from_secs(5),
            )),
            upnext: Arc::new(UpNextEngine::new(
                extractor,
                search.clone(),
                TtlCache::with_system_clock(Duration::from_secs(600)),
                Arc::new(NoShuffle),
                Duration::from_secs(5),
            )),
            search,
            library: Arc::new(Mutex::new(
                LibraryStore::new(dir.path().to_path_buf()).await.unwrap(),
            )),
        };

        (router(state, None), dir)
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn stream_returns_url_then_serves_from_cache() {
        let mut extractor = MockMetadataExtractor::new();
        extractor
            .expect_extract()
            .withf(|reference| reference == "https://www.youtube.com/watch?v=abc123")
            .times(1)
            .returning(|_| {
                Ok(VideoInfo {
                    url: Some("https://cdn/x.m4a".to_string()),
                    ..Default::default()
                })
            });
        let (app, _dir) = build_app(extractor).await;

        let uri = "/stream?url=https%3A%2F%2Fwww.youtube.com%2Fwatch%3Fv%3Dabc123";
        let (status, body) = call(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "url": "https://cdn/x.m4a" }));

        let (_, body) = call(&app, Method::GET, uri, None).await;
        assert_eq!(body, json!({ "url": "https://cdn/x.m4a" }));
    }

    #[tokio::test]
    async fn stream_failure_is_an_error_body_not_a_5xx() {
        let mut extractor = MockMetadataExtractor::new();
        extractor
            .expect_extract()
            .returning(|_| Err(ExtractionError::Upstream("Video unavailable".to_string())));
        let (app, _dir) = build_app(extractor).await;

        let (status, body) = call(&app, Method::GET, "/stream?url=bad", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "error": "Stream not found" }));
    }

    #[tokio::test]
    async fn search_returns_frontend_shape() {
        let mut extractor = MockMetadataExtractor::new();
        extractor.expect_extract_search().returning(|_, _| {
            Ok(vec![VideoInfo {
                id: Some("v1".to_string()),
                title: Some("Song".to_string()),
                uploader: Some("Band".to_string()),
                ..Default::default()
            }])
        });
        let (app, _dir) = build_app(extractor).await;

        let (status, body) = call(&app, Method::GET, "/search?q=band", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{
                "videoId": "v1",
                "title": "Song",
                "artist": "Band",
                "thumbnail": "https://img.youtube.com/vi/v1/hqdefault.jpg",
            }])
        );
    }

    #[tokio::test]
    async fn upnext_wraps_queue_and_survives_failures() {
        let mut extractor = MockMetadataExtractor::new();
        extractor
            .expect_extract()
            .returning(|_| Err(ExtractionError::Timeout(Duration::from_secs(6))));
        let (app, _dir) = build_app(extractor).await;

        let (status, body) = call(&app, Method::GET, "/autoplay/upnext?videoId=seed1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "upnext": [] }));
    }

    #[tokio::test]
    async fn playlist_lifecycle() {
        let (app, _dir) = build_app(MockMetadataExtractor::new()).await;

        let (_, created) = call(&app, Method::POST, "/playlist/create", Some(json!({ "name": "Chill" }))).await;
        assert_eq!(created["id"], json!(1));

        let song = json!({ "playlist_id": 1, "videoId": "v1", "title": "Song", "artist": "Band", "thumbnail": "t" });
        let (_, added) = call(&app, Method::POST, "/playlist/add", Some(song.clone())).await;
        assert_eq!(added, json!({ "message": "Song added" }));
        let (_, again) = call(&app, Method::POST, "/playlist/add", Some(song)).await;
        assert_eq!(again, json!({ "message": "Already added" }));

        let (_, all) = call(&app, Method::GET, "/playlist/all", None).await;
        assert_eq!(all["playlists"][0]["songs"][0]["videoId"], json!("v1"));

        let (_, removed) = call(
            &app,
            Method::POST,
            "/playlist/remove",
            Some(json!({ "playlist_id": 1, "videoId": "v1" })),
        )
        .await;
        assert_eq!(removed, json!({ "message": "Song removed" }));

        let (status, _) = call(&app, Method::DELETE, "/playlist/delete?playlist_id=1", None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, all) = call(&app, Method::GET, "/playlist/all", None).await;
        assert_eq!(all, json!({ "playlists": [] }));
    }

    #[tokio::test]
    async fn playlist_errors_carry_status() {
        let (app, _dir) = build_app(MockMetadataExtractor::new()).await;

        let (status, body) = call(&app, Method::POST, "/playlist/create", Some(json!({ "name": " " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Playlist name required" }));

        let (status, _) = call(
            &app,
            Method::POST,
            "/playlist/add",
            Some(json!({ "playlist_id": 7, "videoId": "v1" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn like_toggles() {
        let (app, _dir) = build_app(MockMetadataExtractor::new()).await;
        let uri = "/like?videoId=v1&title=Song&artist=Band";

        let (_, first) = call(&app, Method::POST, uri, None).await;
        assert_eq!(first, json!({ "liked": true, "message": "Song liked" }));

        let (_, liked) = call(&app, Method::GET, "/liked/all", None).await;
        assert_eq!(liked["liked"][0]["videoId"], json!("v1"));

        let (_, second) = call(&app, Method::POST, uri, None).await;
        assert_eq!(second, json!({ "liked": false, "message": "Song unliked" }));
    }

    #[tokio::test]
    async fn cache_stats_reports_both_caches() {
        let (app, _dir) = build_app(MockMetadataExtractor::new()).await;

        let (status, body) = call(&app, Method::GET, "/cache/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stream"]["ttl_secs"], json!(1800));
        assert_eq!(body["upnext"]["ttl_secs"], json!(600));
        assert_eq!(body["stream"]["hit_rate"], json!(0.0));
    }
}
