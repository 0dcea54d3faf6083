use thiserror::Error;

/// Errors that terminate a stream session.
///
/// Per-line decode failures are not session errors; they are dropped
/// inside the read loop. Anything surfacing here means the session is
/// over and recovery requires constructing a new one.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Connect refused, network drop, or a mid-stream read error.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The producer answered the stream request with a non-success
    /// status.
    #[error("stream request rejected: HTTP {0}")]
    Http(reqwest::StatusCode),
}
