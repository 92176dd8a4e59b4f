//! Payload codec
//!
//! Snapshots and their on-disk envelopes are encoded with bincode using
//! fixed-width little-endian integers. Trailing bytes after a decoded value
//! are rejected, so a file with garbage appended never decodes cleanly.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// Encode a value into bytes
pub fn to_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    options()
        .serialize(value)
        .map_err(|e| Error::Serialization(e.to_string()))
}

/// Decode a value from bytes
///
/// Fails if the bytes are truncated, structurally invalid, or followed by
/// trailing data.
pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    options()
        .deserialize(bytes)
        .map_err(|e| Error::Deserialization(e.to_string()))
}
