//! Configuration constants and disk manager settings.

use std::path::{Path, PathBuf};

/// Size of a page in bytes (4KB).
///
/// Page `N` of a file lives at byte offset `N × PAGE_SIZE`. The value
/// matches the OS page size on most systems.
pub const PAGE_SIZE: usize = 4096;

/// Upper bound on concurrently open page files.
///
/// File descriptors handed out by the disk manager lie in `[0, MAX_FD)`.
pub const MAX_FD: usize = 8192;

/// Well-known name of the append-only log file.
pub const LOG_FILE_NAME: &str = "db.log";

/// Settings for a [`DiskManager`](crate::storage::DiskManager).
///
/// # Example
/// ```
/// use pagestore::common::config::DiskManagerConfig;
///
/// let config = DiskManagerConfig::default()
///     .with_max_fd(64)
///     .with_log_path("/tmp/wal.log");
/// assert_eq!(config.max_fd, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskManagerConfig {
    /// Capacity of the file table; also the exclusive upper bound of valid fds.
    pub max_fd: usize,

    /// Location of the log stream.
    pub log_path: PathBuf,
}

impl DiskManagerConfig {
    /// Override the file table capacity.
    pub fn with_max_fd(mut self, max_fd: usize) -> Self {
        self.max_fd = max_fd;
        self
    }

    /// Override the log file location.
    pub fn with_log_path<P: AsRef<Path>>(mut self, log_path: P) -> Self {
        self.log_path = log_path.as_ref().to_path_buf();
        self
    }
}

impl Default for DiskManagerConfig {
    fn default() -> Self {
        Self {
            max_fd: MAX_FD,
            log_path: PathBuf::from(LOG_FILE_NAME),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_power_of_two() {
        assert!(PAGE_SIZE.is_power_of_two());
        assert_eq!(PAGE_SIZE, 4096);
    }

    #[test]
    fn test_default_config() {
        let config = DiskManagerConfig::default();
        assert_eq!(config.max_fd, MAX_FD);
        assert_eq!(config.log_path, PathBuf::from(LOG_FILE_NAME));
    }

    #[test]
    fn test_config_overrides() {
        let config = DiskManagerConfig::default()
            .with_max_fd(3)
            .with_log_path("logs/redo.log");
        assert_eq!(config.max_fd, 3);
        assert_eq!(config.log_path, PathBuf::from("logs/redo.log"));
    }
}
