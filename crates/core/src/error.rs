use thiserror::Error;

/// Top-level error type used across the entire application.
#[derive(Debug, Error)]
pub enum PulseError {
    #[error("config error: {0}")]
    Config(String),

    #[error("source error: {0}")]
    Source(String),

    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Per-record normalization failures.
///
/// All variants are recoverable: the record is dropped and the ingestion loop
/// continues. None of them should ever terminate a session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// Payload could not be decoded as UTF-8 or parsed as a structured record.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The `timestamp` field exists but matches no accepted format.
    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    /// A required field (`timestamp` or the value field) is missing.
    #[error("incomplete record: missing {0}")]
    IncompleteRecord(&'static str),
}

pub type Result<T, E = PulseError> = std::result::Result<T, E>;
