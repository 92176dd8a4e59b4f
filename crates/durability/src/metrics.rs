//! Snapshot store counters
//!
//! Timings are kept as nanosecond totals plus the most recent sample so an
//! exporter can derive rates and averages without a histogram dependency.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Live counters owned by a [`crate::Snapshotter`]
#[derive(Debug, Default)]
pub struct SnapshotMetrics {
    saves: AtomicU64,
    save_failures: AtomicU64,
    save_nanos_total: AtomicU64,
    last_save_nanos: AtomicU64,
    fsync_nanos_total: AtomicU64,
    last_fsync_nanos: AtomicU64,
    quarantined: AtomicU64,
    orphans_removed: AtomicU64,
    db_files_released: AtomicU64,
}

/// Point-in-time copy of [`SnapshotMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotCounters {
    /// Successful saves
    pub saves: u64,
    /// Saves that returned an error
    pub save_failures: u64,
    /// Total wall time of successful saves
    pub save_nanos_total: u64,
    /// Wall time of the most recent successful save
    pub last_save_nanos: u64,
    /// Total time spent in write-and-sync, including failed attempts
    pub fsync_nanos_total: u64,
    /// Time spent in the most recent write-and-sync
    pub last_fsync_nanos: u64,
    /// Files renamed to `.broken`
    pub quarantined: u64,
    /// Orphaned `db.tmp*` files deleted
    pub orphans_removed: u64,
    /// Stale `.snap.db` files deleted
    pub db_files_released: u64,
}

fn nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

impl SnapshotMetrics {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the duration of a write-and-sync call
    pub fn observe_fsync(&self, elapsed: Duration) {
        let n = nanos(elapsed);
        self.fsync_nanos_total.fetch_add(n, Ordering::Relaxed);
        self.last_fsync_nanos.store(n, Ordering::Relaxed);
    }

    /// Record a completed save
    pub fn observe_save(&self, elapsed: Duration) {
        let n = nanos(elapsed);
        self.saves.fetch_add(1, Ordering::Relaxed);
        self.save_nanos_total.fetch_add(n, Ordering::Relaxed);
        self.last_save_nanos.store(n, Ordering::Relaxed);
    }

    /// Record a failed save
    pub fn record_save_failure(&self) {
        self.save_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a quarantined file
    pub fn record_quarantine(&self) {
        self.quarantined.fetch_add(1, Ordering::Relaxed);
    }

    /// Record removed orphan temp files
    pub fn record_orphans_removed(&self, count: u64) {
        self.orphans_removed.fetch_add(count, Ordering::Relaxed);
    }

    /// Record released `.snap.db` files
    pub fn record_db_files_released(&self, count: u64) {
        self.db_files_released.fetch_add(count, Ordering::Relaxed);
    }

    /// Copy the current values
    pub fn snapshot(&self) -> SnapshotCounters {
        SnapshotCounters {
            saves: self.saves.load(Ordering::Relaxed),
            save_failures: self.save_failures.load(Ordering::Relaxed),
            save_nanos_total: self.save_nanos_total.load(Ordering::Relaxed),
            last_save_nanos: self.last_save_nanos.load(Ordering::Relaxed),
            fsync_nanos_total: self.fsync_nanos_total.load(Ordering::Relaxed),
            last_fsync_nanos: self.last_fsync_nanos.load(Ordering::Relaxed),
            quarantined: self.quarantined.load(Ordering::Relaxed),
            orphans_removed: self.orphans_removed.load(Ordering::Relaxed),
            db_files_released: self.db_files_released.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_save_accumulates() {
        let metrics = SnapshotMetrics::new();
        metrics.observe_save(Duration::from_nanos(100));
        metrics.observe_save(Duration::from_nanos(50));

        let c = metrics.snapshot();
        assert_eq!(c.saves, 2);
        assert_eq!(c.save_nanos_total, 150);
        assert_eq!(c.last_save_nanos, 50);
    }

    #[test]
    fn test_observe_fsync() {
        let metrics = SnapshotMetrics::new();
        metrics.observe_fsync(Duration::from_micros(3));

        let c = metrics.snapshot();
        assert_eq!(c.fsync_nanos_total, 3_000);
        assert_eq!(c.last_fsync_nanos, 3_000);
        assert_eq!(c.saves, 0);
    }

    #[test]
    fn test_event_counters() {
        let metrics = SnapshotMetrics::new();
        metrics.record_save_failure();
        metrics.record_quarantine();
        metrics.record_quarantine();
        metrics.record_orphans_removed(3);
        metrics.record_db_files_released(2);

        let c = metrics.snapshot();
        assert_eq!(c.save_failures, 1);
        assert_eq!(c.quarantined, 2);
        assert_eq!(c.orphans_removed, 3);
        assert_eq!(c.db_files_released, 2);
    }
}
