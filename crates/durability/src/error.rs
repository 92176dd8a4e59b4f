//! Snapshot store errors

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias for snapshot store operations
pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Snapshot store errors
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// No candidate in the directory validated and matched
    #[error("no available snapshot")]
    NoSnapshot,

    /// Zero-length file, or envelope with empty payload or zero checksum
    #[error("empty snapshot")]
    EmptySnapshot,

    /// Stored checksum does not match the payload
    #[error("crc mismatch: stored {stored:08x}, computed {computed:08x}")]
    CrcMismatch {
        /// Checksum recorded in the envelope
        stored: u32,
        /// Checksum recomputed over the payload
        computed: u32,
    },

    /// Envelope bytes could not be parsed
    #[error("corrupt snapshot envelope: {0}")]
    CorruptEnvelope(String),

    /// Envelope was valid but its payload is not a snapshot
    #[error("failed to decode snapshot payload: {0}")]
    Decode(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An orphaned temp file could not be removed before listing
    #[error("failed to remove orphaned file {}: {source}", path.display())]
    OrphanCleanup {
        /// Path of the orphaned file
        path: PathBuf,
        /// Underlying failure
        source: std::io::Error,
    },

    /// Invalid snapshotter configuration
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Operation requires snapshot metadata but none was present
    #[error("snapshot has no metadata")]
    MissingMetadata,

    /// In-memory state could not be serialized for writing
    ///
    /// This is a bug in the caller or in the data it handed over. Callers
    /// must treat it as fatal and never retry with the same value.
    #[error("invariant violated: {0}")]
    InvariantViolated(String),
}

impl SnapshotError {
    /// Whether this error means the file on disk failed validation
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            SnapshotError::EmptySnapshot
                | SnapshotError::CrcMismatch { .. }
                | SnapshotError::CorruptEnvelope(_)
                | SnapshotError::Decode(_)
        )
    }

    /// Whether the caller must abort instead of retrying
    pub fn is_fatal(&self) -> bool {
        matches!(self, SnapshotError::InvariantViolated(_))
    }
}
