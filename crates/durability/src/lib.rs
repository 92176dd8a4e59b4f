//! Durability layer for raftsnap
//!
//! This crate handles everything that touches disk:
//!
//! - Snapshot naming: fixed-width hex `(term, index)` filenames
//! - Framing: CRC-32C envelope around every snapshot payload
//! - Crash-safe writes: write-fsync-rename
//! - Directory scanning: newest-first candidates, orphan temp cleanup
//! - Snapshotter: save, load, WAL-marker lookup, quarantine of bad files
//! - Reclamation of stale per-snapshot database files

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config; // Snapshotter configuration
pub mod error; // SnapshotError
pub mod format; // Filenames and checksum envelope
pub mod fs; // Atomic write-and-sync
pub mod metrics; // Save/load counters
pub mod scan; // Directory listing and cleanup
pub mod snapshotter; // Snapshot store

// === Re-exports ===
pub use config::{ConfigError, SnapshotterConfig, DEFAULT_FILE_MODE};
pub use error::{Result, SnapshotError};
pub use format::{
    classify, db_file_name, parse_snap_file_name, snap_file_name, FileKind, SavedSnapshot,
};
pub use fs::write_and_sync_file;
pub use metrics::{SnapshotCounters, SnapshotMetrics};
pub use scan::{release_stale_db_files, snapshot_names, SnapDirScan};
pub use snapshotter::{matches_wal_markers, Snapshotter};

pub use raftsnap_core::{Snapshot, SnapshotMetadata, WalSnapshot};
