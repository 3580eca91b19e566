//! Resolución de URLs de stream con caché.
//!
//! `resolve` es el único punto que llama al extractor para streams: un acierto
//! de caché no hace I/O, un fallo paga la extracción completa. Los fallos no se
//! cachean, así que cada reintento vuelve a extraer.

use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::StreamCache;
use crate::sources::{with_timeout, ExtractionError, MetadataExtractor};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// La extracción funcionó pero no trae ninguna URL utilizable
    #[error("stream not found")]
    NotFound,
}

pub struct StreamResolver {
    extractor: Arc<dyn MetadataExtractor>,
    cache: StreamCache,
    timeout: Duration,
}

impl StreamResolver {
    pub fn new(extractor: Arc<dyn MetadataExtractor>, cache: StreamCache, timeout: Duration) -> Self {
        Self {
            extractor,
            cache,
            timeout,
        }
    }

    pub fn cache(&self) -> &StreamCache {
        &self.cache
    }

    /// URL reproducible para `reference`, o `None` si no se pudo resolver.
    ///
    /// El error concreto sólo queda en los logs.
    pub async fn resolve(&self, reference: &str) -> Option<String> {
        match self.try_resolve(reference).await {
            Ok(url) => Some(url),
            Err(ResolveError::NotFound) => {
                info!("🔍 Sin stream utilizable para: {}", reference);
                None
            }
            Err(ResolveError::Extraction(e)) => {
                warn!("❌ Stream falló para {}: {}", reference, e);
                None
            }
        }
    }

    pub async fn try_resolve(&self, reference: &str) -> Result<String, ResolveError> {
        let key = reference.to_string();

        if let Some(url) = self.cache.get(&key) {
            debug!("✅ Cache hit para stream URL: {}", reference);
            return Ok(url);
        }

        debug!("❌ Cache miss para stream URL: {}", reference);
        let info = with_timeout(self.timeout, self.extractor.extract(reference)).await?;
        let stream_url = info.stream_url().ok_or(ResolveError::NotFound)?;

        // Sin coalescencia por clave: dos fallos concurrentes extraen ambos y
        // la última escritura gana.
        self.cache.put(key, stream_url.clone());
        info!("🎵 Stream resuelto para: {}", reference);
        Ok(stream_url)
    }
}
