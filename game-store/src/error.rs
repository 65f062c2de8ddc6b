//! Error types for the persistence layer.

/// Errors that can occur in the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A Redis operation failed.
    #[error("store backend error: {0}")]
    Backend(#[from] fred::error::Error),

    /// A serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A record that must exist was missing.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}
