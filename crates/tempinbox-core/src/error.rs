//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in delivery and storage.
#[derive(Debug, Error)]
pub enum Error {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Raw message exceeds the configured budget.
    #[error("Message too large: {size} bytes (limit {limit})")]
    MessageTooLarge {
        /// Raw size in bytes.
        size: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// Envelope is missing a usable address.
    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
