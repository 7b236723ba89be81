use std::time::Duration;

use thiserror::Error;

/// Failures reported by the fetch client
#[derive(Error, Debug)]
pub enum FetchError {
    /// The timer fired before the network call produced a response
    #[error("Request took too long! Timeout after {0:?}")]
    Timeout(Duration),

    /// A response arrived but its status is outside the success range
    #[error("{message} ({status})")]
    Http { status: u16, message: String },

    /// Network failure, unreadable body, or a body of the wrong shape
    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

/// Failures of the key/value storage capability
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored content could not be encoded or decoded
    #[error("Storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors surfaced by state store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// The fetch client failed; state was left untouched
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Malformed recipe upload input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A bookmark lookup or delete did not match any stored recipe
    #[error("No bookmark with id '{0}'")]
    NotFoundLocal(String),

    /// The operation needs a loaded recipe and there is none
    #[error("No recipe is loaded")]
    NoRecipe,

    /// A newer request on the same channel was issued while this one was in flight
    #[error("Result discarded: superseded by a newer request")]
    Stale,

    /// Persisting bookmarks failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
