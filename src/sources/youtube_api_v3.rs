use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};

use super::{
    metadata::{thumbnail_for, UNKNOWN_ARTIST, UNKNOWN_TITLE},
    ExtractionError, Metadata,
};

const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/search";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: ItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemId {
    #[serde(default)]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    channel_title: Option<String>,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    default: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    high: Option<Thumbnail>,
    standard: Option<Thumbnail>,
    maxres: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

impl Thumbnails {
    /// La miniatura más grande disponible
    fn richest(&self) -> Option<&str> {
        [
            &self.maxres,
            &self.standard,
            &self.high,
            &self.medium,
            &self.default,
        ]
        .into_iter()
        .flatten()
        .map(|t| t.url.as_str())
        .find(|url| !url.is_empty())
    }
}

impl SearchItem {
    fn into_metadata(self) -> Option<Metadata> {
        let id = self.id.video_id.filter(|id| !id.is_empty())?;
        let thumbnail_url = self
            .snippet
            .thumbnails
            .richest()
            .map(str::to_string)
            .unwrap_or_else(|| thumbnail_for(&id));

        Some(Metadata {
            title: self
                .snippet
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            artist: self
                .snippet
                .channel_title
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            thumbnail_url,
            related: Vec::new(),
            id,
        })
    }
}

/// Cliente de búsqueda con clave para YouTube Data API v3
pub struct YouTubeApiClient {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

impl YouTubeApiClient {
    pub fn new(api_key: String) -> Result<Self, ExtractionError> {
        Self::with_endpoint(api_key, SEARCH_ENDPOINT.to_string())
    }

    pub fn with_endpoint(api_key: String, endpoint: String) -> Result<Self, ExtractionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            api_key,
            endpoint,
            client,
        })
    }

    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Metadata>, ExtractionError> {
        debug!("🔍 Búsqueda YouTube API v3: {}", query);

        let max_results = limit.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("type", "video"),
                ("maxResults", max_results.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            error!("❌ YouTube API error: {} - {}", status, message);
            return Err(ExtractionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = response.json().await?;
        let results = Self::normalize(body);

        info!("✅ YouTube API v3: {} resultados", results.len());
        Ok(results)
    }

    fn normalize(body: SearchResponse) -> Vec<Metadata> {
        body.items
            .into_iter()
            .filter_map(SearchItem::into_metadata)
            .collect()
    }
}
