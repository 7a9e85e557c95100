//! Error types shared by the fetch gateway, the cache and the paging
//! controller.
//!
//! Every [`FetchError`] ends its life at the paging controller, which turns it
//! into a `Failed(message)` status using the `Display` text below.  Keep the
//! messages short and human-readable: they are shown verbatim in the status
//! bar.

use std::time::Duration;

use thiserror::Error;

/// Failures of the local SQLite cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("cache thread: {0}")]
    Io(#[from] std::io::Error),

    /// The background thread has exited and can no longer take commands.
    #[error("cache unavailable")]
    Unavailable,
}

/// Failures of a single page request, from policy check to cache write.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS or body-read failure.
    #[error("{0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Refused by the network policy before any request was made.
    #[error("{0}")]
    Blocked(String),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}
