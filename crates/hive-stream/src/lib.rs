//! Hive Stream - the live telemetry stream client
//!
//! Consumes the producer's long-lived NDJSON response: raw byte
//! chunks are reassembled into complete lines by the [`LineDecoder`],
//! each line is classified and applied to the bounded feed, and the
//! whole pipeline is driven by a [`StreamSession`] with an explicit
//! lifecycle and external teardown.

pub mod decoder;
pub mod error;
pub mod session;

pub use decoder::LineDecoder;
pub use error::StreamError;
pub use session::{FeedState, SessionState, SharedFeed, StreamSession};
