use dashmap::DashMap;
use serde::Serialize;
use std::{
    hash::Hash,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};
use tracing::debug;

use super::clock::{Clock, SystemClock};

/// Entrada con marca de creación
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    created_at: Instant,
}

impl<V> CacheEntry<V> {
    /// Válida mientras `now - created_at < ttl`
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) >= ttl
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    expired_removals: AtomicU64,
}

/// Caché clave/valor con TTL fijo y expiración perezosa.
///
/// La expiración sólo se comprueba al leer: no hay tarea de limpieza en
/// segundo plano, así que la memoria crece con el número de claves distintas
/// pedidas. Las escrituras concurrentes sobre la misma clave se resuelven con
/// "gana la última".
pub struct TtlCache<K: Clone + Eq + Hash, V> {
    data: Arc<DashMap<K, CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    counters: Arc<Counters>,
}

impl<K, V> TtlCache<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            data: Arc::new(DashMap::new()),
            ttl,
            clock,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn with_system_clock(ttl: Duration) -> Self {
        Self::new(ttl, Arc::new(SystemClock))
    }

    /// Devuelve el valor si existe y no ha expirado.
    ///
    /// Una entrada expirada se elimina aquí mismo. Se usa `remove_if` para no
    /// borrar una entrada fresca que otra tarea haya escrito entre medias.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();

        if let Some(entry) = self.data.get(key) {
            if !entry.is_expired(now, self.ttl) {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
        }

        let ttl = self.ttl;
        if self
            .data
            .remove_if(key, |_, entry| entry.is_expired(now, ttl))
            .is_some()
        {
            self.counters.expired_removals.fetch_add(1, Ordering::Relaxed);
            debug!("⏰ Entrada expirada removida del caché");
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Inserta o reemplaza la entrada de `key`, devolviendo el valor anterior.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        let entry = CacheEntry {
            value,
            created_at: self.clock.now(),
        };
        self.data.insert(key, entry).map(|old| old.value)
    }

    /// Número de entradas físicas, incluidas las expiradas aún no leídas
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn metrics(&self) -> CacheMetrics {
        let hits = self.counters.hits.load(Ordering::Relaxed);
        let misses = self.counters.misses.load(Ordering::Relaxed);

        CacheMetrics {
            hits,
            misses,
            hit_rate: hit_rate(hits, misses),
            expired_removals: self.counters.expired_removals.load(Ordering::Relaxed),
            entries: self.data.len(),
            ttl_secs: self.ttl.as_secs(),
        }
    }
}

impl<K, V> Clone for TtlCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            ttl: self.ttl,
            clock: self.clock.clone(),
            counters: self.counters.clone(),
        }
    }
}

/// Métricas básicas del cache
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub expired_removals: u64,
    pub entries: usize,
    pub ttl_secs: u64,
}

fn hit_rate(hits: u64, misses: u64) -> f64 {
    if hits + misses == 0 {
        0.0
    } else {
        hits as f64 / (hits + misses) as f64
    }
}
