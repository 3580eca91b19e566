//! # Autoplay Module
//!
//! Builds the "up next" continuation queue for a seed video.
//!
//! ## Pipeline
//!
//! 1. Extract the seed and take up to [`upnext::MAX_RELATED`] related entries.
//! 2. If there are none, search for `"<artist> <title>"` (or `"popular songs"`).
//! 3. Drop the seed and duplicate ids, then rank: same artist first, then
//!    titles/artists mentioning "music" ([`ranking`]).
//! 4. Shuffle the ranked list once ([`shuffle`]). The randomness is injected so
//!    tests can use a fixed seed or [`shuffle::NoShuffle`].
//! 5. Keep the first [`upnext::MAX_QUEUE`] entries and cache them per seed.
//!
//! Upstream failures never escape: the engine answers with an empty queue and
//! logs the cause.

pub mod ranking;
pub mod shuffle;
pub mod upnext;

pub use shuffle::{NoShuffle, RandomShuffler, Shuffler};
pub use upnext::UpNextEngine;
