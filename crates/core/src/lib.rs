//! Core types for raftsnap
//!
//! This crate defines the data model shared by the snapshot store:
//! - Snapshot: opaque state blob plus its `(term, index)` provenance
//! - SnapshotMetadata: the `(term, index)` pair itself
//! - WalSnapshot: snapshot marker recorded by the write-ahead log
//! - Codec: the structured message format used for snapshot payloads
//! - Error: encode/decode error type

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod error;
pub mod types;

pub use codec::{from_bytes, to_bytes};
pub use error::{Error, Result};
pub use types::{Snapshot, SnapshotMetadata, WalSnapshot};
