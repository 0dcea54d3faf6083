//! The stream session: one attempt to hold and consume the live feed.
//!
//! Owns the whole pipeline for the lifetime of a single connection:
//! open the long-lived request, read chunks, decode lines, classify
//! records, apply them to the feed, and report connection state. The
//! session never retries; constructing a new session is the caller's
//! restart policy.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::{watch, RwLock};

use hive_feed::LogFeed;
use hive_protocol::{classify_line, StreamRecord};

use crate::decoder::LineDecoder;
use crate::error::StreamError;

/// Lifecycle of a stream session.
///
/// `Idle -> Connecting -> Streaming -> (Closed | Failed)`. External
/// teardown from any state lands in `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Streaming,
    Closed,
    Failed,
}

/// State shared between the session task and its renderers.
///
/// Written only from the session's read loop; everyone else takes
/// read locks and snapshots. Single-writer confinement is what keeps
/// apply order equal to newline order without further coordination.
#[derive(Debug)]
pub struct FeedState {
    pub feed: LogFeed,
    /// The two-valued flag surfaced to the presentation layer.
    pub connected: bool,
    pub session: SessionState,
    /// Lines dropped because they failed to parse.
    pub malformed_lines: u64,
}

impl FeedState {
    fn new(capacity: usize) -> Self {
        Self {
            feed: LogFeed::new(capacity),
            connected: false,
            session: SessionState::Idle,
            malformed_lines: 0,
        }
    }
}

pub type SharedFeed = Arc<RwLock<FeedState>>;

/// One attempt to consume the producer's `/stream` endpoint.
pub struct StreamSession {
    client: reqwest::Client,
    stream_url: String,
    shared: SharedFeed,
    shutdown: watch::Receiver<bool>,
}

impl StreamSession {
    /// Create a session with an empty feed of the given capacity.
    ///
    /// `shutdown` tears the session down externally: flipping it to
    /// `true` (or dropping its sender) abandons any in-flight read,
    /// and no further feed mutation happens afterwards.
    pub fn new(base_url: &str, feed_capacity: usize, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            client: reqwest::Client::new(),
            stream_url: format!("{}/stream", base_url.trim_end_matches('/')),
            shared: Arc::new(RwLock::new(FeedState::new(feed_capacity))),
            shutdown,
        }
    }

    /// Handle to the shared feed view for renderers.
    pub fn shared(&self) -> SharedFeed {
        Arc::clone(&self.shared)
    }

    /// Drive the session to completion.
    ///
    /// Returns `Ok(())` on graceful end-of-stream or teardown, and the
    /// terminal error otherwise. Exactly one connection attempt is
    /// made.
    pub async fn run(self) -> Result<(), StreamError> {
        let mut shutdown = self.shutdown.clone();
        self.shared.write().await.session = SessionState::Connecting;
        tracing::debug!(url = %self.stream_url, "Opening execution stream");

        // The connect await must lose races against teardown too: a
        // peer that accepts the socket and then never sends headers
        // would otherwise pin the session in `Connecting`.
        let response = tokio::select! {
            _ = shutdown.changed() => {
                tracing::debug!("Stream session torn down while connecting");
                self.close().await;
                return Ok(());
            }
            result = self.client.get(&self.stream_url).send() => match result {
                Ok(response) => response,
                Err(e) => {
                    self.fail().await;
                    return Err(StreamError::Transport(e));
                }
            }
        };
        if !response.status().is_success() {
            let status = response.status();
            self.fail().await;
            return Err(StreamError::Http(status));
        }

        {
            let mut state = self.shared.write().await;
            state.session = SessionState::Streaming;
            state.connected = true;
        }
        tracing::info!(url = %self.stream_url, "Execution stream connected");

        let mut body = response.bytes_stream();
        let mut decoder = LineDecoder::new();

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    // Torn down (or the owner dropped the handle):
                    // abandon the in-flight read, mutate nothing more.
                    tracing::debug!("Stream session torn down");
                    self.close().await;
                    return Ok(());
                }
                chunk = body.next() => match chunk {
                    Some(Ok(bytes)) => {
                        for line in decoder.feed(&bytes) {
                            if *shutdown.borrow() {
                                self.close().await;
                                return Ok(());
                            }
                            self.apply_line(&line).await;
                        }
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Execution stream read failed");
                        self.fail().await;
                        return Err(StreamError::Transport(e));
                    }
                    None => {
                        if let Some(tail) = decoder.finish() {
                            tracing::debug!(
                                bytes = tail.len(),
                                "Discarding unterminated tail at end of stream"
                            );
                        }
                        tracing::info!("Execution stream closed by producer");
                        self.close().await;
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Classify one line and commit it to the feed.
    ///
    /// A parse failure is local: the line is dropped, counted, and the
    /// session keeps reading.
    async fn apply_line(&self, line: &str) {
        match classify_line(line) {
            Ok(StreamRecord::Log(entry)) => {
                let mut state = self.shared.write().await;
                if !state.feed.push(entry) {
                    tracing::trace!("Duplicate entry id dropped");
                }
            }
            Ok(StreamRecord::ForkUpdate(update)) => {
                let mut state = self.shared.write().await;
                if !state.feed.apply_fork_update(update.log_id, update.forks) {
                    // Benign race: the update beat its entry, or the
                    // entry was already evicted.
                    tracing::trace!(log_id = update.log_id, "Fork update for unknown entry");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed stream line");
                self.shared.write().await.malformed_lines += 1;
            }
        }
    }

    async fn close(&self) {
        let mut state = self.shared.write().await;
        state.session = SessionState::Closed;
        state.connected = false;
    }

    async fn fail(&self) {
        let mut state = self.shared.write().await;
        state.session = SessionState::Failed;
        state.connected = false;
    }
}
