//! On-disk formats for the snapshot directory.
//!
//! # Module Structure
//!
//! - `naming`: filename encoding for snapshots and auxiliary files
//! - `frame`: checksum envelope wrapped around every snapshot payload

pub mod frame;
pub mod naming;

pub use frame::{
    checksum, decode_snapshot, encode_snapshot, frame, unframe, SavedSnapshot, ENVELOPE_HEADER_SIZE,
};
pub use naming::{
    broken_file_name, classify, db_file_name, is_known_aux_file, parse_db_file_index,
    parse_snap_file_name, snap_file_name, FileKind, BROKEN_SUFFIX, DB_TMP_PREFIX, KNOWN_AUX_FILES,
    SNAP_DB_SUFFIX, SNAP_SUFFIX,
};
