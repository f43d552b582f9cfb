//! Disk I/O statistics.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Transfer counters kept by the disk manager.
///
/// All fields are atomic, so concurrent page and log transfers update them
/// without a lock. `Ordering::Relaxed` is enough: each counter is independent
/// and only needs atomic increments.
///
/// # Example
/// ```
/// use pagestore::storage::DiskStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = DiskStats::new();
/// stats.pages_written.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.snapshot().pages_written, 1);
/// ```
#[derive(Debug, Default)]
pub struct DiskStats {
    /// Completed `read_page` calls.
    pub pages_read: AtomicU64,

    /// Completed `write_page` calls.
    pub pages_written: AtomicU64,

    /// Bytes moved by `read_page`.
    pub page_bytes_read: AtomicU64,

    /// Bytes moved by `write_page`.
    pub page_bytes_written: AtomicU64,

    /// Bytes appended by `write_log`.
    pub log_bytes_written: AtomicU64,

    /// Bytes returned by `read_log`.
    pub log_bytes_read: AtomicU64,
}

impl DiskStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_page_read(&self, bytes: usize) {
        self.pages_read.fetch_add(1, Ordering::Relaxed);
        self.page_bytes_read.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_page_write(&self, bytes: usize) {
        self.pages_written.fetch_add(1, Ordering::Relaxed);
        self.page_bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_log_write(&self, bytes: usize) {
        self.log_bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_log_read(&self, bytes: usize) {
        self.log_bytes_read.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Get a non-atomic copy of the current counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages_read: self.pages_read.load(Ordering::Relaxed),
            pages_written: self.pages_written.load(Ordering::Relaxed),
            page_bytes_read: self.page_bytes_read.load(Ordering::Relaxed),
            page_bytes_written: self.page_bytes_written.load(Ordering::Relaxed),
            log_bytes_written: self.log_bytes_written.load(Ordering::Relaxed),
            log_bytes_read: self.log_bytes_read.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.pages_read.store(0, Ordering::Relaxed);
        self.pages_written.store(0, Ordering::Relaxed);
        self.page_bytes_read.store(0, Ordering::Relaxed);
        self.page_bytes_written.store(0, Ordering::Relaxed);
        self.log_bytes_written.store(0, Ordering::Relaxed);
        self.log_bytes_read.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time copy of [`DiskStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub pages_read: u64,
    pub pages_written: u64,
    pub page_bytes_read: u64,
    pub page_bytes_written: u64,
    pub log_bytes_written: u64,
    pub log_bytes_read: u64,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DiskStats {{ pages read: {} ({} B), pages written: {} ({} B), log: +{} B / {} B read }}",
            self.pages_read,
            self.page_bytes_read,
            self.pages_written,
            self.page_bytes_written,
            self.log_bytes_written,
            self.log_bytes_read
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = DiskStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_stats_record() {
        let stats = DiskStats::new();
        stats.record_page_write(4096);
        stats.record_page_write(100);
        stats.record_page_read(4096);
        stats.record_log_write(8);
        stats.record_log_read(4);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.pages_written, 2);
        assert_eq!(snapshot.page_bytes_written, 4196);
        assert_eq!(snapshot.pages_read, 1);
        assert_eq!(snapshot.page_bytes_read, 4096);
        assert_eq!(snapshot.log_bytes_written, 8);
        assert_eq!(snapshot.log_bytes_read, 4);
    }

    #[test]
    fn test_stats_reset() {
        let stats = DiskStats::new();
        stats.record_page_read(10);
        stats.record_log_write(10);

        stats.reset();

        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_stats_display() {
        let stats = DiskStats::new();
        stats.record_page_write(4096);
        stats.record_log_write(12);

        let display = format!("{}", stats.snapshot());
        assert!(display.contains("pages written: 1 (4096 B)"));
        assert!(display.contains("log: +12 B"));
    }
}
