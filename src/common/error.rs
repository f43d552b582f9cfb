//! Error types for the paging core.

use std::path::PathBuf;

use thiserror::Error;

use crate::common::Fd;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Direction of a page or log transfer, used in byte-count errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOp {
    ReadPage,
    WritePage,
    ReadLog,
    WriteLog,
}

impl std::fmt::Display for TransferOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TransferOp::ReadPage => "read_page",
            TransferOp::WritePage => "write_page",
            TransferOp::ReadLog => "read_log",
            TransferOp::WriteLog => "write_log",
        };
        f.write_str(name)
    }
}

/// All errors raised by the disk manager.
///
/// The eviction policy never fails: an empty replacer is reported through
/// `victim()` returning `None`, not through this type.
#[derive(Debug, Error)]
pub enum Error {
    /// Seek, read, write, sync or close failed in the OS.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A transfer moved a different number of bytes than requested.
    ///
    /// Covers short reads past end-of-file and partial writes. Never retried.
    #[error("{op}: expected {expected} bytes, transferred {actual}")]
    ShortTransfer {
        op: TransferOp,
        expected: usize,
        actual: usize,
    },

    /// Exclusive create hit an existing path.
    #[error("File already exists: {}", .0.display())]
    FileExists(PathBuf),

    /// Path missing on open, or unlink failed.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Attempted to destroy a file that is still open.
    #[error("File not closed: {}", .0.display())]
    FileNotClosed(PathBuf),

    /// The fd is not tracked by the file table.
    #[error("File not open: {0}")]
    FileNotOpen(Fd),

    /// Directory creation or removal failed.
    #[error("OS error on {}: {source}", .path.display())]
    Os {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The fd lies outside `[0, max_fd)`.
    #[error("Invalid file descriptor: {0}")]
    InvalidFd(Fd),

    /// Every page number of the fd has been handed out.
    #[error("Page space exhausted for {0}")]
    PageSpaceExhausted(Fd),

    /// The file table is at capacity.
    #[error("Too many open files (limit {0})")]
    TooManyOpenFiles(usize),

    /// The caller asked to transfer more bytes than its buffer holds.
    #[error("Buffer too small: requested {requested} bytes, buffer holds {available}")]
    BufferTooSmall { requested: usize, available: usize },
}

impl Error {
    /// Whether this error belongs to the I/O class (OS failure or byte-count mismatch).
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_) | Error::ShortTransfer { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::FileNotOpen(Fd::new(7));
        assert_eq!(format!("{}", err), "File not open: Fd(7)");

        let err = Error::ShortTransfer {
            op: TransferOp::ReadPage,
            expected: 4096,
            actual: 10,
        };
        assert_eq!(format!("{}", err), "read_page: expected 4096 bytes, transferred 10");

        let err = Error::FileExists(PathBuf::from("t1"));
        assert_eq!(format!("{}", err), "File already exists: t1");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        assert!(matches!(err, Error::Io(_)));
        assert!(err.is_io());
    }

    #[test]
    fn test_is_io_classification() {
        let short = Error::ShortTransfer {
            op: TransferOp::WriteLog,
            expected: 4,
            actual: 0,
        };
        assert!(short.is_io());
        assert!(!Error::FileNotFound(PathBuf::from("x")).is_io());
        assert!(!Error::InvalidFd(Fd::new(1)).is_io());
    }
}
