//! # Nebula Backend
//!
//! Aggregation layer behind the Nebula music player: resolves playable
//! stream URLs, searches the video platform, builds "up next" autoplay queues
//! and keeps playlists and likes.
//!
//! - [`cache`]: TTL caches for streams and up-next queues
//! - [`sources`]: extractor adapter, keyed search API and search facade
//! - [`stream`]: cached stream resolution
//! - [`autoplay`]: up-next ranking engine
//! - [`storage`]: JSON playlist/likes repository
//! - [`api`]: axum router and handlers
//! - [`config`]: environment configuration

pub mod api;
pub mod autoplay;
pub mod cache;
pub mod config;
pub mod sources;
pub mod storage;
pub mod stream;
