//! Error types for MIME operations.
//!
//! The message decoder never fails; these errors come from the strict
//! helpers that callers may use directly.

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed RFC 2047 encoded word.
    #[error("Invalid encoded word: {0}")]
    InvalidEncodedWord(String),

    /// Base64 decode error.
    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),
}
