use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};

use super::{with_timeout, ExtractionError, Metadata, MetadataExtractor, YouTubeApiClient};

/// Resultados de la búsqueda general
pub const SEARCH_LIMIT: usize = 20;

/// Normaliza las búsquedas del extractor y de la API con clave a [`Metadata`].
///
/// No cachea: cada llamada sale a la red.
pub struct SearchFacade {
    extractor: Arc<dyn MetadataExtractor>,
    api: Option<YouTubeApiClient>,
    timeout: Duration,
}

impl SearchFacade {
    pub fn new(
        extractor: Arc<dyn MetadataExtractor>,
        api: Option<YouTubeApiClient>,
        timeout: Duration,
    ) -> Self {
        Self {
            extractor,
            api,
            timeout,
        }
    }

    /// Búsqueda general (hasta 20 resultados). Vacía si el upstream falla.
    pub async fn search(&self, query: &str) -> Vec<Metadata> {
        self.search_related(query, SEARCH_LIMIT).await
    }

    /// Igual que [`SearchFacade::search`] con otro tope de resultados
    pub async fn search_related(&self, query: &str, limit: usize) -> Vec<Metadata> {
        match self.try_search(query, limit).await {
            Ok(results) => results,
            Err(e) => {
                warn!("❌ Búsqueda falló para '{}': {}", query, e);
                Vec::new()
            }
        }
    }

    /// Prueba la API con clave si está configurada y cae a yt-dlp si falla
    pub async fn try_search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Metadata>, ExtractionError> {
        if let Some(api) = &self.api {
            match with_timeout(self.timeout, api.search(query, limit)).await {
                Ok(results) => return Ok(results),
                Err(e) => warn!("⚠️ YouTube API falló, usando yt-dlp: {}", e),
            }
        }

        let entries = with_timeout(self.timeout, self.extractor.extract_search(query, limit)).await?;
        let results: Vec<Metadata> = entries.iter().filter_map(Metadata::from_entry).collect();

        debug!("🔍 '{}': {} resultados", query, results.len());
        Ok(results)
    }
}
