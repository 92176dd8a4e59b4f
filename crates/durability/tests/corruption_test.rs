//! Corruption detection tests
//!
//! These tests verify that damaged snapshot files are detected and
//! quarantined instead of crashing the load path:
//! - CRC-32C detects bit flips in the payload
//! - truncated and empty files are rejected
//! - a bad newest file falls back to the next older one
//! - quarantine leaves a `.broken` file for inspection

use raftsnap_durability::format::frame::{self, SavedSnapshot, ENVELOPE_HEADER_SIZE};
use raftsnap_durability::format::naming::{broken_file_name, snap_file_name};
use raftsnap_durability::{Snapshot, SnapshotError, Snapshotter, WalSnapshot};
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use tempfile::TempDir;

fn flip_byte(path: &Path, offset: u64) {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .unwrap();

    file.seek(SeekFrom::Start(offset)).unwrap();
    let mut buf = [0u8; 1];
    file.read_exact(&mut buf).unwrap();

    buf[0] ^= 0x01;

    file.seek(SeekFrom::Start(offset)).unwrap();
    file.write_all(&buf).unwrap();
    file.sync_all().unwrap();
}

#[test]
fn test_bit_flip_in_payload_is_quarantined() {
    let temp_dir = TempDir::new().unwrap();
    let ss = Snapshotter::new(temp_dir.path());
    let snap = Snapshot::new(1, 1, b"replicated state".to_vec());
    ss.save_snap(&snap).unwrap();

    let name = snap_file_name(1, 1);
    let path = temp_dir.path().join(&name);
    let len = std::fs::metadata(&path).unwrap().len();

    // Every payload byte is covered by the checksum
    for offset in [ENVELOPE_HEADER_SIZE as u64, len / 2 + 6, len - 1] {
        let bytes = {
            let mut copy = std::fs::read(&path).unwrap();
            copy[offset as usize] ^= 0x01;
            copy
        };
        assert!(matches!(
            frame::unframe(&bytes),
            Err(SnapshotError::CrcMismatch { .. })
        ));
    }

    flip_byte(&path, len - 1);

    assert!(matches!(ss.load(), Err(SnapshotError::NoSnapshot)));
    assert!(!path.exists());
    assert!(temp_dir.path().join(broken_file_name(&name)).exists());
    assert_eq!(ss.counters().quarantined, 1);
}

#[test]
fn test_quarantined_file_keeps_original_bytes() {
    let temp_dir = TempDir::new().unwrap();
    let ss = Snapshotter::new(temp_dir.path());
    ss.save_snap(&Snapshot::new(1, 4, vec![4; 8])).unwrap();

    let name = snap_file_name(1, 4);
    let path = temp_dir.path().join(&name);
    let len = std::fs::metadata(&path).unwrap().len();
    flip_byte(&path, len - 1);
    let damaged = std::fs::read(&path).unwrap();

    let _ = ss.load();

    let broken_path = temp_dir.path().join(broken_file_name(&name));
    let broken = std::fs::read(broken_path).unwrap();
    assert_eq!(broken, damaged);
}

#[test]
fn test_corrupt_newest_falls_back_to_older() {
    let temp_dir = TempDir::new().unwrap();
    let ss = Snapshotter::new(temp_dir.path());
    for index in 1..=3 {
        let snap = Snapshot::new(1, index, vec![index as u8; 16]);
        ss.save_snap(&snap).unwrap();
    }

    let newest = temp_dir.path().join(snap_file_name(1, 3));
    let len = std::fs::metadata(&newest).unwrap().len();
    flip_byte(&newest, len - 1);

    let snap = ss.load().unwrap();

    assert_eq!(snap.index(), 2);
    let broken = broken_file_name(&snap_file_name(1, 3));
    assert!(temp_dir.path().join(broken).exists());
    // A second load no longer sees the quarantined file
    assert_eq!(ss.snapshot_names().unwrap().len(), 2);
}

#[test]
fn test_corrupt_marker_match_falls_back() {
    let temp_dir = TempDir::new().unwrap();
    let ss = Snapshotter::new(temp_dir.path());
    ss.save_snap(&Snapshot::new(1, 1, b"a".to_vec())).unwrap();
    ss.save_snap(&Snapshot::new(1, 2, b"b".to_vec())).unwrap();
    let newest = temp_dir.path().join(snap_file_name(1, 2));
    std::fs::write(newest, b"").unwrap();

    let markers = [WalSnapshot::new(1, 1), WalSnapshot::new(1, 2)];
    let snap = ss.load_newest_available(&markers).unwrap();

    assert_eq!(snap.index(), 1);
}

#[test]
fn test_truncated_file_is_quarantined() {
    let temp_dir = TempDir::new().unwrap();
    let ss = Snapshotter::new(temp_dir.path());
    ss.save_snap(&Snapshot::new(2, 8, vec![9; 64])).unwrap();

    let name = snap_file_name(2, 8);
    let path = temp_dir.path().join(&name);
    let len = std::fs::metadata(&path).unwrap().len();
    OpenOptions::new()
        .write(true)
        .open(&path)
        .unwrap()
        .set_len(len - 10)
        .unwrap();

    assert!(matches!(ss.load(), Err(SnapshotError::NoSnapshot)));
    assert!(temp_dir.path().join(broken_file_name(&name)).exists());
}

#[test]
fn test_zero_checksum_envelope_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let ss = Snapshotter::new(temp_dir.path());

    let payload = Snapshot::new(1, 1, vec![1]).to_bytes().unwrap();
    let envelope = raftsnap_core::to_bytes(&SavedSnapshot {
        crc: 0,
        data: payload,
    })
    .unwrap();
    assert!(matches!(
        frame::unframe(&envelope),
        Err(SnapshotError::EmptySnapshot)
    ));

    let name = snap_file_name(1, 1);
    let path = temp_dir.path().join(&name);
    std::fs::write(path, &envelope).unwrap();

    assert!(matches!(ss.load(), Err(SnapshotError::NoSnapshot)));
    assert!(temp_dir.path().join(broken_file_name(&name)).exists());
}

#[test]
fn test_valid_envelope_with_foreign_payload() {
    let temp_dir = TempDir::new().unwrap();
    let ss = Snapshotter::new(temp_dir.path());
    let name = snap_file_name(1, 1);
    std::fs::write(
        temp_dir.path().join(&name),
        frame::frame(b"definitely not a snapshot").unwrap(),
    )
    .unwrap();

    assert!(matches!(ss.load(), Err(SnapshotError::NoSnapshot)));
    assert!(temp_dir.path().join(broken_file_name(&name)).exists());
}

#[test]
fn test_unreadable_candidate_is_quarantined() {
    let temp_dir = TempDir::new().unwrap();
    let ss = Snapshotter::new(temp_dir.path());
    ss.save_snap(&Snapshot::new(1, 1, vec![1])).unwrap();

    // A directory with a snapshot name cannot be read as a file
    let name = snap_file_name(1, 2);
    std::fs::create_dir(temp_dir.path().join(&name)).unwrap();

    assert_eq!(ss.load().unwrap().index(), 1);
    assert!(temp_dir.path().join(broken_file_name(&name)).is_dir());
}
