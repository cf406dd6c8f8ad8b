//! Unified error types for the mention cache.
//!
//! Display strings carry a stable code prefix so hosts can match on them
//! without depending on the enum.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

use crate::config::ConfigError;

/// Unified error types for sync, cache and query operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., an empty URL passed to a query).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Required option missing or malformed. Raised before any I/O.
    #[error("CONFIG_ERROR: {0}")]
    Config(#[from] ConfigError),

    /// The feed answered, but without the configured response key.
    #[error("FEED_CONTRACT: `{key}` not found in response from {feed}")]
    FeedContract { key: String, feed: String },

    /// Network failure or unreadable body.
    #[error("TRANSPORT_ERROR: {0}")]
    Transport(String),

    /// Non-success HTTP status from the feed.
    #[error("HTTP_ERROR: status {status} from {feed}")]
    HttpStatus { status: u16, feed: String },

    /// Record without a resolvable target, rejected at grouping time.
    #[error("MALFORMED_RECORD: mention from {0} has no target")]
    MalformedRecord(String),

    /// No cache entry found for the given key.
    #[error("CACHE_MISS: {0}")]
    CacheMiss(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Stored or fetched JSON could not be (de)serialized.
    #[error("CACHE_ERROR: serialization failed: {0}")]
    Serialization(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),
}

impl Error {
    /// Whether the sync engine absorbs this error and keeps its working set.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Error::FeedContract { .. } | Error::Transport(_) | Error::HttpStatus { .. })
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::Config(e) => (-32603, e.to_string()),
            Error::FeedContract { .. } => (-32010, err.to_string()),
            Error::Transport(msg) => (-32011, msg.clone()),
            Error::HttpStatus { .. } => (-32012, err.to_string()),
            Error::MalformedRecord(msg) => (-32013, msg.clone()),
            Error::CacheMiss(msg) => (-32001, msg.clone()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
            Error::Serialization(msg) => (-32002, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
