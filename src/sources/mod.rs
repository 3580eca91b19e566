//! # Sources Module
//!
//! Boundary with the external video platform.
//!
//! - [`MetadataExtractor`]: the black-box extraction capability
//!   (`extract(reference)` / `extract_search(query, count)`), implemented by
//!   [`YtDlpExtractor`] and mocked in tests.
//! - [`YouTubeApiClient`]: keyed YouTube Data API v3 search.
//! - [`SearchFacade`]: normalises both upstream shapes into [`Metadata`].
//!
//! Every failure is classified as an [`ExtractionError`]. Callers above this
//! layer collapse it into an empty result and log it.

pub mod metadata;
pub mod search;
pub mod youtube_api_v3;
pub mod ytdlp;

use async_trait::async_trait;
use std::{future::Future, time::Duration};
use thiserror::Error;

pub use metadata::{thumbnail_for, watch_url, FormatInfo, Metadata, ThumbnailInfo, VideoInfo};
pub use search::SearchFacade;
pub use youtube_api_v3::YouTubeApiClient;
pub use ytdlp::YtDlpExtractor;

/// Fallos de red o de parseo al hablar con el upstream
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// No se pudo lanzar el proceso extractor
    #[error("failed to launch extractor: {0}")]
    Launch(#[from] std::io::Error),

    /// El extractor terminó con error; lleva el texto del upstream
    #[error("extractor error: {0}")]
    Upstream(String),

    #[error("failed to parse extractor output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("extraction timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Capacidad de extracción de metadata del upstream.
///
/// Las llamadas pueden ser lentas, fallar o devolver datos parciales.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    /// Extrae la información completa de un video (URL o id)
    async fn extract(&self, reference: &str) -> Result<VideoInfo, ExtractionError>;

    /// Búsqueda plana de hasta `count` videos
    async fn extract_search(
        &self,
        query: &str,
        count: usize,
    ) -> Result<Vec<VideoInfo>, ExtractionError>;
}

/// Acota la duración de una llamada externa.
///
/// Si el límite vence el futuro se descarta, pero el proceso ya lanzado no se
/// cancela: termina por su cuenta.
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, ExtractionError>
where
    F: Future<Output = Result<T, ExtractionError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| ExtractionError::Timeout(limit))?
}
