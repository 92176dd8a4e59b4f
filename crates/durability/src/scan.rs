//! Snapshot directory scanning and cleanup
//!
//! Listing a directory also tidies it:
//! - `db.tmp*` files orphaned by an interrupted defragmentation are deleted
//! - unexpected non-snapshot files are reported but left alone
//! - `.snap` names are returned newest first
//!
//! Stale `.snap.db` files are reclaimed separately by
//! [`release_stale_db_files`], once the caller knows which snapshot it
//! retains.

use std::io;
use std::path::Path;

use tracing::{error, info, warn};

use crate::error::{Result, SnapshotError};
use crate::format::naming::{classify, parse_db_file_index, FileKind};

/// Result of scanning a snapshot directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapDirScan {
    /// Snapshot filenames, newest first
    pub names: Vec<String>,
    /// Number of orphaned temp files deleted during the scan
    pub orphans_removed: usize,
}

impl SnapDirScan {
    /// Snapshot names, or [`SnapshotError::NoSnapshot`] if there are none
    pub fn into_names(self) -> Result<Vec<String>> {
        if self.names.is_empty() {
            return Err(SnapshotError::NoSnapshot);
        }
        Ok(self.names)
    }
}

/// Names of all entries in `dir`
///
/// Entries whose names are not valid UTF-8 cannot match any known pattern
/// and are skipped with a warning.
pub fn read_dir_names(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => {
                warn!(target: "raftsnap::snap", name = ?raw, "Skipping non UTF-8 file name");
            }
        }
    }
    Ok(names)
}

/// Delete orphaned `db.tmp*` files and return the remaining names
///
/// A file that is already gone counts as removed. Any other failure aborts
/// the scan, since a leftover temp file could later be misclassified.
pub fn cleanup_snapdir(dir: &Path, names: Vec<String>) -> Result<(Vec<String>, usize)> {
    let mut kept = Vec::with_capacity(names.len());
    let mut removed = 0;
    for name in names {
        if classify(&name) != FileKind::OrphanTemp {
            kept.push(name);
            continue;
        }

        let path = dir.join(&name);
        info!(
            target: "raftsnap::snap",
            path = %path.display(),
            "Found orphaned defragmentation file; deleting"
        );
        match std::fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(SnapshotError::OrphanCleanup { path, source }),
        }
    }
    Ok((kept, removed))
}

/// Keep `.snap` names, warning about unexpected files
pub fn check_suffix(names: Vec<String>) -> Vec<String> {
    let mut snaps = Vec::new();
    for name in names {
        match classify(&name) {
            FileKind::Snapshot => snaps.push(name),
            FileKind::AuxDb => {}
            _ => {
                warn!(
                    target: "raftsnap::snap",
                    path = %name,
                    "Found unexpected non-snap file; skipping"
                );
            }
        }
    }
    snaps
}

/// Scan `dir`: clean orphans, then collect snapshot names newest first
///
/// An empty `names` list is not an error here, so the orphan count is
/// reported even when no snapshot remains.
pub fn scan_snapdir(dir: &Path) -> Result<SnapDirScan> {
    let names = read_dir_names(dir)?;
    let (names, orphans_removed) = cleanup_snapdir(dir, names)?;
    let mut names = check_suffix(names);
    names.sort_unstable_by(|a, b| b.cmp(a));
    Ok(SnapDirScan {
        names,
        orphans_removed,
    })
}

/// Snapshot filenames in `dir`, newest first
///
/// Fails with [`SnapshotError::NoSnapshot`] if no `.snap` file remains.
pub fn snapshot_names(dir: &Path) -> Result<Vec<String>> {
    scan_snapdir(dir)?.into_names()
}

/// Delete `.snap.db` files whose index is below `retained_index`
///
/// Files with an unparseable index are logged and kept. Failed deletions
/// are logged and do not fail the call. Returns the number of files
/// removed.
pub fn release_stale_db_files(dir: &Path, retained_index: u64) -> Result<usize> {
    let mut removed = 0;
    for name in read_dir_names(dir)? {
        if classify(&name) != FileKind::SnapshotDb {
            continue;
        }

        let index = match parse_db_file_index(&name) {
            Ok(index) => index,
            Err(e) => {
                error!(
                    target: "raftsnap::snap",
                    path = %name,
                    error = %e,
                    "Failed to parse index from snapshot database filename"
                );
                continue;
            }
        };

        if index >= retained_index {
            continue;
        }

        let path = dir.join(&name);
        info!(
            target: "raftsnap::snap",
            path = %path.display(),
            index,
            retained_index,
            "Found stale .snap.db file; deleting"
        );
        match std::fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                error!(
                    target: "raftsnap::snap",
                    path = %path.display(),
                    error = %e,
                    "Failed to remove stale .snap.db file"
                );
            }
        }
    }
    Ok(removed)
}
