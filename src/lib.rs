//! raftsnap - durable point-snapshot store for a consensus log
//!
//! raftsnap persists opaque state blobs identified by `(term, index)`,
//! checksums every file it writes, and on load returns the newest snapshot
//! that validates. Files that fail validation are quarantined, never fatal.
//!
//! # Quick Start
//!
//! ```no_run
//! use raftsnap::{Snapshot, Snapshotter, WalSnapshot};
//!
//! # fn main() -> raftsnap::Result<()> {
//! let snapshotter = Snapshotter::new("/var/lib/node/snap");
//!
//! snapshotter.save_snap(&Snapshot::new(1, 42, b"state".to_vec()))?;
//!
//! let latest = snapshotter.load()?;
//! let trusted = snapshotter.load_newest_available(&[WalSnapshot::new(1, 42)])?;
//! assert_eq!(latest, trusted);
//!
//! snapshotter.release_snap_dbs(&trusted)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! The data model lives in `raftsnap-core`; naming, framing, scanning and
//! the [`Snapshotter`] itself live in `raftsnap-durability`. This crate
//! re-exports the public API of both.

pub use raftsnap_durability::*;
