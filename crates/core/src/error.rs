//! Error types for the snapshot data model
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while encoding or decoding snapshot payloads
#[derive(Debug, Error)]
pub enum Error {
    /// Value could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Bytes could not be decoded into the requested type
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}
