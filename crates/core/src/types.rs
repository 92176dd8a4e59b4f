//! Snapshot data model
//!
//! This module defines the foundational types:
//! - SnapshotMetadata: `(term, index)` provenance of a snapshot
//! - Snapshot: opaque application state plus optional metadata
//! - WalSnapshot: marker the WAL records for each snapshot it trusts

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::codec;
use crate::error::Result;

/// Position of a snapshot in the replicated log
///
/// Ordering is lexicographic over `(term, index)`, matching the order of
/// snapshot filenames on disk.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct SnapshotMetadata {
    /// Consensus epoch
    pub term: u64,
    /// Log position covered by the snapshot
    pub index: u64,
}

impl SnapshotMetadata {
    /// Create metadata for the given term and index
    pub fn new(term: u64, index: u64) -> Self {
        SnapshotMetadata { term, index }
    }
}

impl fmt::Display for SnapshotMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "term={} index={}", self.term, self.index)
    }
}

/// Point-in-time copy of application state
///
/// `data` is opaque to the store. A snapshot without metadata, or with
/// `index == 0`, is not meaningful yet and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Provenance of the state, if known
    pub metadata: Option<SnapshotMetadata>,
    /// Serialized application state
    pub data: Vec<u8>,
}

impl Snapshot {
    /// Create a snapshot at `(term, index)` holding `data`
    pub fn new(term: u64, index: u64, data: Vec<u8>) -> Self {
        Snapshot {
            metadata: Some(SnapshotMetadata::new(term, index)),
            data,
        }
    }

    /// Term of the snapshot, 0 if metadata is absent
    pub fn term(&self) -> u64 {
        self.metadata.map_or(0, |m| m.term)
    }

    /// Index of the snapshot, 0 if metadata is absent
    pub fn index(&self) -> u64 {
        self.metadata.map_or(0, |m| m.index)
    }

    /// Whether the snapshot carries metadata with a non-zero index
    pub fn is_persistable(&self) -> bool {
        self.index() != 0
    }

    /// Encode the snapshot into its payload bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        codec::to_bytes(self)
    }

    /// Decode a snapshot from payload bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        codec::from_bytes(bytes)
    }
}

/// Snapshot marker recorded in the write-ahead log
///
/// The WAL keeps one marker per snapshot it has seen committed. A snapshot
/// on disk is only consistent with the log if its metadata equals one of
/// these markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WalSnapshot {
    /// Term of the marked snapshot
    pub term: u64,
    /// Index of the marked snapshot
    pub index: u64,
}

impl WalSnapshot {
    /// Create a marker for `(term, index)`
    pub fn new(term: u64, index: u64) -> Self {
        WalSnapshot { term, index }
    }

    /// Whether this marker refers to the snapshot described by `meta`
    pub fn matches(&self, meta: &SnapshotMetadata) -> bool {
        self.term == meta.term && self.index == meta.index
    }
}

impl From<SnapshotMetadata> for WalSnapshot {
    fn from(meta: SnapshotMetadata) -> Self {
        WalSnapshot::new(meta.term, meta.index)
    }
}
