//! On-disk configuration for the spectator console.
//!
//! Loaded from `~/.config/hive-console/config.toml` when present;
//! every field has a default and CLI flags override the file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use hive_feed::DEFAULT_FEED_CAPACITY;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Base URL of the Hive API.
    pub base_url: String,
    /// Leaderboard poll interval in seconds.
    pub leaderboard_poll_secs: u64,
    /// Live feed retention bound.
    pub feed_capacity: usize,
    /// Print feed entries as plain lines instead of running the TUI.
    pub headless: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            leaderboard_poll_secs: 5,
            feed_capacity: DEFAULT_FEED_CAPACITY,
            headless: false,
        }
    }
}

impl ConsoleConfig {
    /// Default config file location under the platform config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hive-console").join("config.toml"))
    }

    /// Load from `path` (or the default location). A missing file
    /// yields the defaults; a present but unreadable file is an
    /// error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = toml::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_producer_contract() {
        let config = ConsoleConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.feed_capacity, 50);
        assert_eq!(config.leaderboard_poll_secs, 5);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: ConsoleConfig =
            toml::from_str("base_url = \"http://hive.example:9000\"").expect("partial config");
        assert_eq!(config.base_url, "http://hive.example:9000");
        assert_eq!(config.feed_capacity, 50);
        assert!(!config.headless);
    }
}
