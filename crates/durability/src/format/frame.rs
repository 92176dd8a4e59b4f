//! Checksum envelope for snapshot files
//!
//! ## Envelope Layout
//!
//! ```text
//! +------------------+
//! | CRC32C (4)       |  Castagnoli checksum of payload
//! +------------------+
//! | Length (8)       |  Payload length in bytes
//! +------------------+
//! | Payload          |  Encoded Snapshot
//! +------------------+
//! ```
//!
//! The envelope is itself encoded with the core codec, which produces the
//! layout above. A torn or bit-flipped file either fails to parse or fails
//! the checksum; it never decodes as a different snapshot.

use raftsnap_core::Snapshot;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SnapshotError};

/// Bytes preceding the payload in an encoded envelope
pub const ENVELOPE_HEADER_SIZE: usize = 12;

/// On-disk envelope: checksum plus the payload it covers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSnapshot {
    /// CRC-32C of `data`
    pub crc: u32,
    /// Encoded snapshot
    pub data: Vec<u8>,
}

/// CRC-32C (Castagnoli) of `data`
pub fn checksum(data: &[u8]) -> u32 {
    crc32c::crc32c(data)
}

/// Wrap `payload` in a checksummed envelope
pub fn frame(payload: &[u8]) -> Result<Vec<u8>> {
    let envelope = SavedSnapshot {
        crc: checksum(payload),
        data: payload.to_vec(),
    };
    raftsnap_core::to_bytes(&envelope)
        .map_err(|e| SnapshotError::InvariantViolated(format!("encode envelope: {}", e)))
}

/// Validate an envelope and return its payload
///
/// # Errors
///
/// - `EmptySnapshot` for zero-length input, an empty payload, or a zero checksum
/// - `CorruptEnvelope` if the envelope does not parse
/// - `CrcMismatch` if the payload does not match its checksum
pub fn unframe(bytes: &[u8]) -> Result<Vec<u8>> {
    if bytes.is_empty() {
        return Err(SnapshotError::EmptySnapshot);
    }

    let envelope: SavedSnapshot = raftsnap_core::from_bytes(bytes)
        .map_err(|e| SnapshotError::CorruptEnvelope(e.to_string()))?;

    if envelope.data.is_empty() || envelope.crc == 0 {
        return Err(SnapshotError::EmptySnapshot);
    }

    let computed = checksum(&envelope.data);
    if computed != envelope.crc {
        return Err(SnapshotError::CrcMismatch {
            stored: envelope.crc,
            computed,
        });
    }

    Ok(envelope.data)
}

/// Encode and frame a snapshot for writing
///
/// A snapshot that cannot be encoded is reported as
/// [`SnapshotError::InvariantViolated`].
pub fn encode_snapshot(snapshot: &Snapshot) -> Result<Vec<u8>> {
    let payload = snapshot
        .to_bytes()
        .map_err(|e| SnapshotError::InvariantViolated(format!("encode snapshot: {}", e)))?;
    frame(&payload)
}

/// Unframe and decode a snapshot read from disk
pub fn decode_snapshot(bytes: &[u8]) -> Result<Snapshot> {
    let payload = unframe(bytes)?;
    Snapshot::from_bytes(&payload).map_err(|e| SnapshotError::Decode(e.to_string()))
}
