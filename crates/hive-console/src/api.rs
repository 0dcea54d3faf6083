//! One-shot collaborators of the stream client: the polled
//! leaderboard and the per-agent history endpoint.

use anyhow::Context;

use hive_protocol::{LeaderboardEntry, LogEntry};

/// Plain request/response client for the Hive API.
#[derive(Debug, Clone)]
pub struct HiveApi {
    client: reqwest::Client,
    base_url: String,
}

impl HiveApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Top entries ranked by fork count.
    pub async fn fetch_leaderboard(&self) -> anyhow::Result<Vec<LeaderboardEntry>> {
        let url = format!("{}/leaderboard", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("fetching leaderboard")?
            .error_for_status()
            .context("leaderboard request rejected")?;
        response.json().await.context("decoding leaderboard")
    }

    /// One agent's past entries, most recent first.
    pub async fn fetch_agent_logs(&self, agent_id: &str) -> anyhow::Result<Vec<LogEntry>> {
        let url = format!("{}/agent/{}/logs", self.base_url, agent_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("fetching history for agent {agent_id}"))?
            .error_for_status()
            .context("agent history request rejected")?;
        response.json().await.context("decoding agent history")
    }
}
