use std::{sync::Arc, time::Duration};
use tracing::{debug, info, warn};

use super::{
    ranking::{dedupe_candidates, rank_candidates},
    shuffle::Shuffler,
};
use crate::cache::UpNextCache;
use crate::sources::{watch_url, with_timeout, ExtractionError, Metadata, MetadataExtractor, SearchFacade};

/// Relacionados del upstream que se consideran
pub const MAX_RELATED: usize = 25;
/// Resultados pedidos a la búsqueda de respaldo
pub const FALLBACK_RESULTS: usize = 15;
/// Longitud máxima de la cola
pub const MAX_QUEUE: usize = 20;

/// Candidatos crudos de un video semilla
struct Candidates {
    /// Id que resolvió el extractor; puede diferir de la referencia pedida
    seed_id: Option<String>,
    /// Artista de la semilla en minúsculas (puede estar vacío)
    seed_artist: String,
    items: Vec<Metadata>,
}

/// Construye la cola "up next" de un video.
///
/// Por semilla: `UNSEEN -> POPULATED` o `UNSEEN -> EMPTY`; ambos estados
/// vuelven a `UNSEEN` cuando vence el TTL del caché.
pub struct UpNextEngine {
    extractor: Arc<dyn MetadataExtractor>,
    search: Arc<SearchFacade>,
    cache: UpNextCache,
    shuffler: Arc<dyn Shuffler>,
    lookup_timeout: Duration,
}

impl UpNextEngine {
    pub fn new(
        extractor: Arc<dyn MetadataExtractor>,
        search: Arc<SearchFacade>,
        cache: UpNextCache,
        shuffler: Arc<dyn Shuffler>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            extractor,
            search,
            cache,
            shuffler,
            lookup_timeout,
        }
    }

    pub fn cache(&self) -> &UpNextCache {
        &self.cache
    }

    /// Cola de continuación para `seed`. Nunca falla: ante errores del
    /// upstream devuelve (y cachea) una cola vacía.
    pub async fn build_up_next(&self, seed: &str) -> Vec<Metadata> {
        let key = seed.to_string();

        if let Some(queue) = self.cache.get(&key) {
            debug!("✅ Up next desde caché para: {}", seed);
            return queue;
        }

        let queue = match self.gather_candidates(seed).await {
            Ok(candidates) => self.assemble(seed, candidates),
            Err(e) => {
                warn!("❌ Up next falló para {}: {}", seed, e);
                Vec::new()
            }
        };

        info!("🔁 Up next para {}: {} canciones", seed, queue.len());
        self.cache.put(key, queue.clone());
        queue
    }

    async fn gather_candidates(&self, seed: &str) -> Result<Candidates, ExtractionError> {
        let info = with_timeout(self.lookup_timeout, self.extractor.extract(&watch_url(seed))).await?;

        let seed_artist = info.primary_artist().unwrap_or_default().to_lowercase();
        let (seed_id, mut items) = match Metadata::with_related(&info, MAX_RELATED) {
            Some(seed_meta) => (Some(seed_meta.id), seed_meta.related),
            None => (None, info.related_metadata(MAX_RELATED)),
        };

        if items.is_empty() {
            let query = info.fallback_query();
            debug!("🔍 Sin relacionados para {}, buscando: '{}'", seed, query);

            items = match with_timeout(
                self.lookup_timeout,
                self.search.try_search(&query, FALLBACK_RESULTS),
            )
            .await
            {
                Ok(results) => results,
                Err(e) => {
                    warn!("⚠️ Búsqueda de respaldo falló para '{}': {}", query, e);
                    Vec::new()
                }
            };
        }

        Ok(Candidates {
            seed_id,
            seed_artist,
            items,
        })
    }

    fn assemble(&self, seed: &str, candidates: Candidates) -> Vec<Metadata> {
        let mut seed_ids = vec![seed];
        seed_ids.extend(candidates.seed_id.as_deref());

        let mut queue = dedupe_candidates(candidates.items, &seed_ids);
        rank_candidates(&mut queue, &candidates.seed_artist);

        // Mezcla deliberada sobre la lista ya ordenada
        self.shuffler.shuffle(&mut queue);

        queue.truncate(MAX_QUEUE);
        queue
    }
}
