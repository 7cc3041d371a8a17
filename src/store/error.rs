//! Error types for persisted state operations.

use thiserror::Error;

/// Errors that can occur while reading or writing persisted state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("state database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be decoded.
    #[error("stored value for '{key}' is corrupt: {source}")]
    Corrupt {
        /// The state key whose value failed to decode.
        key: String,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be encoded for storage.
    #[error("failed to encode value for '{key}': {source}")]
    Encode {
        /// The state key being written.
        key: String,
        /// Encoder failure.
        #[source]
        source: serde_json::Error,
    },

    /// The backing store refused the operation.
    #[error("state store unavailable: {0}")]
    Unavailable(String),
}
