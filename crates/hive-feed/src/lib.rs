//! Hive Feed - the live entry store
//!
//! An ordered, bounded, deduplicated collection of recent log
//! entries. Append order is arrival order; the oldest entries are
//! evicted on overflow. Mutated only by the stream session that owns
//! it.

pub mod feed;

pub use feed::{LogFeed, DEFAULT_FEED_CAPACITY};
