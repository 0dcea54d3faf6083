use thiserror::Error;

/// Errors produced while decoding wire records.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The line was not valid JSON, or the object did not match
    /// either record shape.
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
}
