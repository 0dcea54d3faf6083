//! Hive spectator console binary.
//!
//! Connects to a hive producer, tails its live execution stream, and
//! renders it either as an interactive TUI or as plain stdout lines.

mod api;
mod config;
mod headless;
mod poller;
mod spectator_console;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use config::ConsoleConfig;

#[derive(Parser, Debug)]
#[command(name = "hive-console", about = "Spectator console for a hive producer", version)]
struct Args {
    /// Base URL of the hive producer (overrides config file).
    #[arg(long)]
    base_url: Option<String>,

    /// Leaderboard poll interval in seconds (overrides config file).
    #[arg(long)]
    poll_secs: Option<u64>,

    /// Live feed capacity (overrides config file).
    #[arg(long)]
    feed_capacity: Option<usize>,

    /// Tail the stream to stdout instead of the TUI.
    #[arg(long)]
    headless: bool,

    /// Path to a config file (defaults to the user config directory).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // The TUI owns the screen, so diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = ConsoleConfig::load(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(poll_secs) = args.poll_secs {
        config.leaderboard_poll_secs = poll_secs;
    }
    if let Some(feed_capacity) = args.feed_capacity {
        config.feed_capacity = feed_capacity;
    }
    if args.headless {
        config.headless = true;
    }

    if config.headless {
        headless::run(&config).await
    } else {
        spectator_console::run_spectator_console(&config).await
    }
}
