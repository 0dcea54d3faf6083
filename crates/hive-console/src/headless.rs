//! Headless mode: tail the execution stream to stdout without a TUI.
//!
//! Useful over SSH or when piping the feed into other tooling. Prints
//! each entry once as it lands in the feed and exits when the stream
//! ends or on Ctrl+C.

use std::collections::HashSet;
use std::time::Duration;

use tokio::sync::watch;
use tracing::info;

use hive_stream::{SessionState, StreamSession};

use crate::config::ConsoleConfig;
use crate::spectator_console::clock_time;

pub async fn run(config: &ConsoleConfig) -> anyhow::Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let session = StreamSession::new(&config.base_url, config.feed_capacity, shutdown_rx);
    let shared = session.shared();
    let mut session_task = tokio::spawn(session.run());

    info!(base_url = %config.base_url, "headless tail started");

    // Ids already printed. Pruned to the feed's current contents so an
    // entry evicted and re-delivered later prints again, matching how
    // the feed itself treats it as new.
    let mut printed: HashSet<u64> = HashSet::new();
    let mut final_state = SessionState::Idle;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                let _ = shutdown_tx.send(true);
                break;
            }
            _ = tokio::time::sleep(Duration::from_millis(200)) => {
                let state = shared.read().await;
                let live: HashSet<u64> = state.feed.entries().map(|e| e.id).collect();
                printed.retain(|id| live.contains(id));
                for entry in state.feed.entries() {
                    if printed.insert(entry.id) {
                        let activity = match entry.strategy_name.as_deref() {
                            Some(strategy) => format!("{} {}", strategy, entry.message),
                            None => entry.message.clone(),
                        };
                        println!(
                            "{} [{}] {} {}",
                            clock_time(&entry.timestamp),
                            entry.level,
                            entry.agent_id,
                            activity
                        );
                    }
                }
                final_state = state.session;
                if matches!(final_state, SessionState::Closed | SessionState::Failed) {
                    break;
                }
            }
        }
    }

    match (&mut session_task).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(e.into()),
        Err(e) if e.is_cancelled() => {}
        Err(e) => return Err(e.into()),
    }

    if final_state == SessionState::Failed {
        anyhow::bail!("stream session failed");
    }
    Ok(())
}
