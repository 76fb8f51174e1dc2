//! Error types for MIME composition.

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid header name or value.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// A required field was missing from the message spec.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Base64 decode error.
    #[error("base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),
}
