//! # Cache Module
//!
//! In-memory memoization for the two expensive lookups of the backend.
//!
//! - **Stream cache**: `video reference -> playable stream URL`, 30 minute TTL.
//! - **Up-next cache**: `seed video id -> ranked continuation queue`, 10 minute TTL.
//!
//! Both are instances of [`TtlCache`], constructed once at start-up and shared
//! by handle. Expiry is lazy: an entry is checked when it is read and removed
//! if it is past its TTL. There is no background sweep, so memory is bounded
//! only by the number of distinct keys ever requested.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use nebula_backend::cache::{StreamCache, TtlCache};
//! use std::time::Duration;
//!
//! let cache: StreamCache = TtlCache::with_system_clock(Duration::from_secs(30 * 60));
//! cache.put("abc123".to_string(), "https://cdn/x.m4a".to_string());
//!
//! if let Some(url) = cache.get(&"abc123".to_string()) {
//!     println!("stream: {url}");
//! }
//! ```

pub mod clock;
pub mod ttl_cache;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ttl_cache::{CacheMetrics, TtlCache};

use crate::sources::Metadata;

/// Caché de URLs de stream resueltas
pub type StreamCache = TtlCache<String, String>;

/// Caché de colas "up next" por video semilla
pub type UpNextCache = TtlCache<String, Vec<Metadata>>;
