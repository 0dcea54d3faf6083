//! Fixed-interval leaderboard poll: fetch-and-replace, no overlap
//! protection needed because replacing the whole list is idempotent.
//! A failed poll keeps the previous standings on screen.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use hive_protocol::LeaderboardEntry;

use crate::api::HiveApi;

pub type SharedLeaderboard = Arc<RwLock<Vec<LeaderboardEntry>>>;

pub fn spawn_leaderboard_poller(
    api: HiveApi,
    board: SharedLeaderboard,
    interval_secs: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs.max(1)));
        loop {
            ticker.tick().await;
            let fetched = api.fetch_leaderboard().await;
            let mut current = board.write().await;
            apply_poll_result(&mut current, fetched);
        }
    })
}

fn apply_poll_result(
    current: &mut Vec<LeaderboardEntry>,
    fetched: anyhow::Result<Vec<LeaderboardEntry>>,
) {
    match fetched {
        Ok(rows) => *current = rows,
        Err(e) => {
            tracing::warn!(error = %e, "Leaderboard poll failed; keeping previous standings");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: u64, agent: &str) -> LeaderboardEntry {
        LeaderboardEntry {
            id,
            agent_id: agent.to_string(),
            strategy_name: "S".to_string(),
            forks: 1,
            hashrate: "1 TH/s".to_string(),
        }
    }

    #[test]
    fn successful_poll_replaces_the_whole_list() {
        let mut board = vec![row(1, "old")];
        apply_poll_result(&mut board, Ok(vec![row(2, "new-a"), row(3, "new-b")]));
        let agents: Vec<&str> = board.iter().map(|r| r.agent_id.as_str()).collect();
        assert_eq!(agents, vec!["new-a", "new-b"]);
    }

    #[test]
    fn failed_poll_keeps_previous_standings() {
        let mut board = vec![row(1, "kept")];
        apply_poll_result(&mut board, Err(anyhow::anyhow!("connection refused")));
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].agent_id, "kept");
    }
}
