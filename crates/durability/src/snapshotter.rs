//! Snapshot store
//!
//! Persists snapshots as framed, checksummed files and loads the newest one
//! that validates. Loading never fails because of a single bad file: a
//! candidate that cannot be read or validated is renamed to `.broken` and
//! the next older candidate is tried.
//!
//! ## Usage
//!
//! ```ignore
//! let snapshotter = Snapshotter::new("/var/lib/node/snap");
//! snapshotter.save_snap(&Snapshot::new(term, index, state))?;
//!
//! // On restart, pick the newest snapshot the WAL agrees with
//! let snap = snapshotter.load_newest_available(&wal_markers)?;
//! snapshotter.release_snap_dbs(&snap)?;
//! ```
//!
//! The store keeps no in-memory state besides its directory, config and
//! counters. It assumes a single writer per directory.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use raftsnap_core::{Snapshot, WalSnapshot};
use tracing::{debug, error, warn};

use crate::config::SnapshotterConfig;
use crate::error::{Result, SnapshotError};
use crate::format::frame::{decode_snapshot, encode_snapshot};
use crate::format::naming::{broken_file_name, snap_file_name};
use crate::fs::write_and_sync_file;
use crate::metrics::{SnapshotCounters, SnapshotMetrics};
use crate::scan;

/// Whether `snapshot` matches one of the WAL markers
///
/// Markers are checked newest first. A snapshot without metadata matches
/// nothing.
pub fn matches_wal_markers(snapshot: &Snapshot, wal_snaps: &[WalSnapshot]) -> bool {
    match snapshot.metadata {
        Some(meta) => wal_snaps.iter().rev().any(|w| w.matches(&meta)),
        None => false,
    }
}

/// Durable snapshot store rooted at one directory
#[derive(Debug)]
pub struct Snapshotter {
    dir: PathBuf,
    config: SnapshotterConfig,
    metrics: SnapshotMetrics,
}

impl Snapshotter {
    /// Create a snapshotter with default configuration
    ///
    /// Does no I/O; the directory is expected to exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Snapshotter {
            dir: dir.into(),
            config: SnapshotterConfig::default(),
            metrics: SnapshotMetrics::new(),
        }
    }

    /// Create a snapshotter with a validated configuration
    ///
    /// Creates the directory if `config.create_dir` is set.
    pub fn open(dir: impl Into<PathBuf>, config: SnapshotterConfig) -> Result<Self> {
        config.validate()?;
        let dir = dir.into();
        if config.create_dir {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(Snapshotter {
            dir,
            config,
            metrics: SnapshotMetrics::new(),
        })
    }

    /// Snapshot directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Active configuration
    pub fn config(&self) -> &SnapshotterConfig {
        &self.config
    }

    /// Current counter values
    pub fn counters(&self) -> SnapshotCounters {
        self.metrics.snapshot()
    }

    /// Persist a snapshot
    ///
    /// A snapshot without metadata or with index 0 is not written and the
    /// call succeeds. On write failure the partially written file is
    /// removed (best-effort) and the write error is returned.
    ///
    /// That removal targets the final `<term>-<index>.snap` path. Re-saving
    /// a position that already has a valid file and failing therefore
    /// deletes the earlier file too. Loading then falls back to an older
    /// snapshot, which is safe; a half-written file under that name is not.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::InvariantViolated`] if the snapshot cannot be
    /// encoded. Treat it as fatal.
    pub fn save_snap(&self, snapshot: &Snapshot) -> Result<()> {
        if !snapshot.is_persistable() {
            return Ok(());
        }
        self.save(snapshot)
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let start = Instant::now();
        let name = snap_file_name(snapshot.term(), snapshot.index());
        let path = self.dir.join(name);

        let bytes = match encode_snapshot(snapshot) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(
                    target: "raftsnap::snap",
                    path = %path.display(),
                    error = %e,
                    "Refusing to persist snapshot that cannot be encoded"
                );
                self.metrics.record_save_failure();
                return Err(e);
            }
        };

        let fsync_start = Instant::now();
        let result = write_and_sync_file(
            &path,
            &bytes,
            self.config.file_mode,
            self.config.sync_dir,
        );
        self.metrics.observe_fsync(fsync_start.elapsed());

        if let Err(e) = result {
            warn!(
                target: "raftsnap::snap",
                path = %path.display(),
                error = %e,
                "Failed to write a snap file"
            );
            remove_broken_write(&path);
            self.metrics.record_save_failure();
            return Err(e.into());
        }

        let elapsed = start.elapsed();
        self.metrics.observe_save(elapsed);
        debug!(
            target: "raftsnap::snap",
            path = %path.display(),
            term = snapshot.term(),
            index = snapshot.index(),
            size_bytes = bytes.len(),
            elapsed_us = elapsed.as_micros() as u64,
            "Snapshot saved"
        );
        Ok(())
    }

    /// Load the newest snapshot that validates
    pub fn load(&self) -> Result<Snapshot> {
        self.load_matched(|_| true)
    }

    /// Load the newest snapshot whose `(term, index)` equals a WAL marker
    ///
    /// `wal_snaps` is ordered oldest to newest. A newer snapshot on disk
    /// that the WAL never recorded is skipped, not quarantined.
    pub fn load_newest_available(&self, wal_snaps: &[WalSnapshot]) -> Result<Snapshot> {
        self.load_matched(|snap| matches_wal_markers(snap, wal_snaps))
    }

    /// Load the newest snapshot that validates and satisfies `matches`
    ///
    /// Candidates are tried newest first. A candidate that fails to read
    /// or validate is quarantined and the scan moves on.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::NoSnapshot`] if no candidate qualifies. Errors
    /// from listing the directory (including orphan cleanup) are returned
    /// as is.
    pub fn load_matched<F>(&self, matches: F) -> Result<Snapshot>
    where
        F: Fn(&Snapshot) -> bool,
    {
        let names = self.scan_names()?;

        for (skipped, name) in names.iter().enumerate() {
            let snap = match self.load_snap(name) {
                Ok(snap) => snap,
                Err(_) => continue,
            };
            if matches(&snap) {
                debug!(
                    target: "raftsnap::snap",
                    name = %name,
                    term = snap.term(),
                    index = snap.index(),
                    skipped,
                    "Loaded snapshot"
                );
                return Ok(snap);
            }
            debug!(target: "raftsnap::snap", name = %name, "Snapshot rejected by matcher");
        }

        Err(SnapshotError::NoSnapshot)
    }

    /// Snapshot filenames in the directory, newest first
    ///
    /// Also removes orphaned temp files, like a load would.
    pub fn snapshot_names(&self) -> Result<Vec<String>> {
        self.scan_names()
    }

    /// Delete `.snap.db` files older than the retained snapshot
    ///
    /// Returns the number of files removed. Individual deletion failures
    /// are logged, not returned.
    pub fn release_snap_dbs(&self, snapshot: &Snapshot) -> Result<usize> {
        let meta = snapshot.metadata.ok_or(SnapshotError::MissingMetadata)?;
        let removed = scan::release_stale_db_files(&self.dir, meta.index)?;
        self.metrics.record_db_files_released(removed as u64);
        Ok(removed)
    }

    /// Scan the directory, counting removed orphans even if no snapshot is left
    fn scan_names(&self) -> Result<Vec<String>> {
        let scan = scan::scan_snapdir(&self.dir)?;
        let orphans = scan.orphans_removed as u64;
        self.metrics.record_orphans_removed(orphans);
        scan.into_names()
    }

    /// Read and validate one candidate, quarantining it on failure
    fn load_snap(&self, name: &str) -> Result<Snapshot> {
        let path = self.dir.join(name);
        let result = read_snap(&path);
        if let Err(e) = &result {
            warn!(
                target: "raftsnap::snap",
                path = %path.display(),
                error = %e,
                "Failed to read a snap file"
            );
            self.quarantine(&path, name);
        }
        result
    }

    fn quarantine(&self, path: &Path, name: &str) {
        let broken = self.dir.join(broken_file_name(name));
        match std::fs::rename(path, &broken) {
            Ok(()) => {
                self.metrics.record_quarantine();
                warn!(
                    target: "raftsnap::snap",
                    path = %path.display(),
                    broken_path = %broken.display(),
                    "Renamed to a broken snap file"
                );
            }
            Err(e) => {
                warn!(
                    target: "raftsnap::snap",
                    path = %path.display(),
                    broken_path = %broken.display(),
                    error = %e,
                    "Failed to rename a broken snap file"
                );
            }
        }
    }
}

fn read_snap(path: &Path) -> Result<Snapshot> {
    let bytes = std::fs::read(path)?;
    decode_snapshot(&bytes)
}

fn remove_broken_write(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            warn!(
                target: "raftsnap::snap",
                path = %path.display(),
                error = %e,
                "Failed to remove a broken snap file"
            );
        }
    }
}
