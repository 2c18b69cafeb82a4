use recovery_core::error::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("document not found: {key}")]
    NotFound { key: String },

    /// Another writer saved first. Reload, reapply the turn, and save again.
    #[error("version conflict for key: {key}")]
    Conflict { key: String },

    /// An id or key segment that is empty, `.`, `..`, or contains a path
    /// separator.
    #[error("invalid store key: {key}")]
    InvalidKey { key: String },

    #[error("invalid document at {key}: {source}")]
    InvalidDocument {
        key: String,
        #[source]
        source: CoreError,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
