//! File descriptor type.

use std::fmt;

/// Handle to a page file opened through the disk manager.
///
/// Fds are allocated as the lowest free slot in `[0, max_fd)`, the same way
/// an OS hands out descriptors, so a closed fd may be reused by a later open.
///
/// # Example
/// ```
/// use pagestore::Fd;
///
/// let fd = Fd::new(3);
/// assert_eq!(fd.index(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fd(pub u32);

impl Fd {
    /// Create a new Fd.
    #[inline]
    pub fn new(fd: u32) -> Self {
        Fd(fd)
    }

    /// Slot index of this fd, for indexing per-fd tables.
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Fd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fd({})", self.0)
    }
}
