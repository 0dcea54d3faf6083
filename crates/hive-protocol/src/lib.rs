//! Hive Protocol - wire types for the Hive spectator surface
//!
//! Models the NDJSON stream contract: one JSON object per
//! newline-terminated line, each either a full `LogEntry` or a
//! `ForkUpdateRecord` delta, plus the JSON shapes of the one-shot
//! leaderboard and agent-history endpoints.

pub mod error;
pub mod level;
pub mod records;

pub use error::*;
pub use level::*;
pub use records::*;
