use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::level::Level;

/// Discriminator value marking a line as a fork-count delta rather
/// than a new entry.
pub const FORK_UPDATE_TYPE: &str = "fork_update";

/// One unit of agent-reported activity.
///
/// `id` is assigned by the producer and is the sole identity key; no
/// other field participates in identity or deduplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    /// Producer-assigned wall-clock timestamp, lexically sortable.
    pub timestamp: String,
    #[serde(default)]
    pub level: Level,
    #[serde(default)]
    pub message: String,
    pub agent_id: String,
    /// Arbitrary structured value carried for display only; never
    /// interpreted by this consumer.
    #[serde(default)]
    pub payload: serde_json::Value,
    pub forks: Option<u64>,
    pub hashrate: Option<String>,
    pub strategy_name: Option<String>,
}

/// A delta record that mutates the fork count of an existing entry.
/// It never creates an entry; an unknown `log_id` makes it a no-op
/// downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForkUpdateRecord {
    pub log_id: u64,
    pub forks: u64,
}

/// One classified line of the execution stream.
#[derive(Debug, Clone)]
pub enum StreamRecord {
    Log(LogEntry),
    ForkUpdate(ForkUpdateRecord),
}

/// Classify one decoded line of the stream.
///
/// The presence of `"type": "fork_update"` is the sole discriminator
/// for a fork update; any other object is decoded as a full
/// `LogEntry`. Missing optional fields default rather than fail.
pub fn classify_line(line: &str) -> Result<StreamRecord, ProtocolError> {
    let value: serde_json::Value = serde_json::from_str(line)?;
    if value.get("type").and_then(|v| v.as_str()) == Some(FORK_UPDATE_TYPE) {
        let update: ForkUpdateRecord = serde_json::from_value(value)?;
        Ok(StreamRecord::ForkUpdate(update))
    } else {
        let entry: LogEntry = serde_json::from_value(value)?;
        Ok(StreamRecord::Log(entry))
    }
}

fn default_hashrate() -> String {
    "0 H/s".to_string()
}

fn default_strategy_name() -> String {
    "Unknown".to_string()
}

/// One row of the polled leaderboard. The endpoint returns full log
/// dicts ranked by fork count; only these fields are displayed, extra
/// fields on the wire are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: u64,
    pub agent_id: String,
    #[serde(default = "default_strategy_name")]
    pub strategy_name: String,
    #[serde(default)]
    pub forks: u64,
    #[serde(default = "default_hashrate")]
    pub hashrate: String,
}
