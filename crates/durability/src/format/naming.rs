//! Snapshot directory naming scheme
//!
//! ```text
//! snap/
//! ├── 0000000000000001-0000000000000005.snap         # framed snapshot (term 1, index 5)
//! ├── 0000000000000005.snap.db                       # per-snapshot state database
//! ├── db                                             # live state database
//! ├── db.tmp.4711                                    # orphaned defragmentation file
//! └── 0000000000000001-0000000000000003.snap.broken  # quarantined snapshot
//! ```
//!
//! Term and index are written as 16 zero-padded lowercase hex digits, so
//! sorting names lexicographically sorts snapshots by `(term, index)`.

use std::num::ParseIntError;

/// Suffix of framed snapshot files
pub const SNAP_SUFFIX: &str = ".snap";

/// Suffix of per-snapshot state database files
pub const SNAP_DB_SUFFIX: &str = ".snap.db";

/// Prefix of temp files orphaned by an interrupted defragmentation
pub const DB_TMP_PREFIX: &str = "db.tmp";

/// Suffix appended to files that failed validation
pub const BROKEN_SUFFIX: &str = ".broken";

/// Non-snapshot files that are expected in the directory
pub const KNOWN_AUX_FILES: &[&str] = &["db"];

/// Classification of a directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `<term>-<index>.snap`
    Snapshot,
    /// `<index>.snap.db`
    SnapshotDb,
    /// One of [`KNOWN_AUX_FILES`]
    AuxDb,
    /// `db.tmp*`
    OrphanTemp,
    /// `*.broken`
    Quarantined,
    /// Anything else
    Unknown,
}

/// Filename for the snapshot at `(term, index)`
pub fn snap_file_name(term: u64, index: u64) -> String {
    format!("{:016x}-{:016x}{}", term, index, SNAP_SUFFIX)
}

/// Parse `(term, index)` from a snapshot filename
///
/// Returns None if the name is not in the canonical form produced by
/// [`snap_file_name`].
pub fn parse_snap_file_name(name: &str) -> Option<(u64, u64)> {
    let stem = name.strip_suffix(SNAP_SUFFIX)?;
    let (term, index) = stem.split_once('-')?;
    if term.len() != 16 || index.len() != 16 {
        return None;
    }
    let term = u64::from_str_radix(term, 16).ok()?;
    let index = u64::from_str_radix(index, 16).ok()?;
    Some((term, index))
}

/// Filename of the state database kept alongside the snapshot at `index`
pub fn db_file_name(index: u64) -> String {
    format!("{:016x}{}", index, SNAP_DB_SUFFIX)
}

/// Parse the index encoded in a `.snap.db` filename
///
/// The text before the suffix must be a hex `u64`; anything else is an
/// error.
pub fn parse_db_file_index(name: &str) -> Result<u64, ParseIntError> {
    let hex = name.strip_suffix(SNAP_DB_SUFFIX).unwrap_or(name);
    u64::from_str_radix(hex, 16)
}

/// Name a file is renamed to when quarantined
pub fn broken_file_name(name: &str) -> String {
    format!("{}{}", name, BROKEN_SUFFIX)
}

/// Whether `name` is one of the expected auxiliary files
pub fn is_known_aux_file(name: &str) -> bool {
    KNOWN_AUX_FILES.contains(&name)
}

/// Classify a directory entry by name
pub fn classify(name: &str) -> FileKind {
    if name.starts_with(DB_TMP_PREFIX) {
        FileKind::OrphanTemp
    } else if name.ends_with(SNAP_SUFFIX) {
        FileKind::Snapshot
    } else if name.ends_with(SNAP_DB_SUFFIX) {
        FileKind::SnapshotDb
    } else if name.ends_with(BROKEN_SUFFIX) {
        FileKind::Quarantined
    } else if is_known_aux_file(name) {
        FileKind::AuxDb
    } else {
        FileKind::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_snap_file_name_format() {
        assert_eq!(
            snap_file_name(1, 5),
            "0000000000000001-0000000000000005.snap"
        );
        assert_eq!(
            snap_file_name(u64::MAX, 0xab),
            "ffffffffffffffff-00000000000000ab.snap"
        );
    }

    #[test]
    fn test_parse_snap_file_name() {
        let name = snap_file_name(7, 300);
        assert_eq!(parse_snap_file_name(&name), Some((7, 300)));
        assert_eq!(parse_snap_file_name("1-5.snap"), None);

        let db = "0000000000000001-0000000000000005.snap.db";
        assert_eq!(parse_snap_file_name(db), None);
        let bad_hex = "000000000000000g-0000000000000005.snap";
        assert_eq!(parse_snap_file_name(bad_hex), None);
    }

    #[test]
    fn test_db_file_name() {
        assert_eq!(db_file_name(0x10), "0000000000000010.snap.db");
        assert_eq!(parse_db_file_index(&db_file_name(0x10)), Ok(0x10));
    }

    #[test]
    fn test_parse_db_file_index_rejects_garbage() {
        assert!(parse_db_file_index("zz.snap.db").is_err());
        assert!(parse_db_file_index(".snap.db").is_err());
        assert!(parse_db_file_index("10000000000000000.snap.db").is_err());
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(&snap_file_name(1, 1)), FileKind::Snapshot);
        assert_eq!(classify(&db_file_name(1)), FileKind::SnapshotDb);
        assert_eq!(classify("db"), FileKind::AuxDb);
        assert_eq!(classify("db.tmp123"), FileKind::OrphanTemp);
        assert_eq!(
            classify(&broken_file_name(&snap_file_name(1, 1))),
            FileKind::Quarantined
        );
        assert_eq!(classify("notes.txt"), FileKind::Unknown);
    }

    proptest! {
        #[test]
        fn filename_order_matches_numeric_order(
            a in any::<(u64, u64)>(),
            b in any::<(u64, u64)>(),
        ) {
            let na = snap_file_name(a.0, a.1);
            let nb = snap_file_name(b.0, b.1);
            prop_assert_eq!(na.cmp(&nb), a.cmp(&b));
        }
    }
}
