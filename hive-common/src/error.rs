use std::path::PathBuf;

use thiserror::Error;

/// Common error type for the HiveOS exporter components.
///
/// The three pipeline kinds (`NotFound`, `ReadFailure`, `Decode`) are all
/// recoverable: the poll loop logs them and tries again on the next tick.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Status file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read status file '{}': {source}", path.display())]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode status document: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// Short, stable name of the error kind, suitable for log fields and labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::NotFound { .. } => "not_found",
            Error::ReadFailure { .. } => "read_failure",
            Error::Decode(_) => "decode_error",
        }
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
