//! Page identifier type.

use std::fmt;

use crate::common::config::PAGE_SIZE;

/// Identifies a logical page within one file.
///
/// Page numbers are allocated per file starting at 0 and are never reused.
///
/// # Example
/// ```
/// use pagestore::PageId;
///
/// let page_id = PageId::new(2);
/// assert!(page_id.is_valid());
/// assert_eq!(page_id.offset(), 8192);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// Sentinel for "no page".
    pub const INVALID: PageId = PageId(u32::MAX);

    /// Create a new PageId.
    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    /// Check if this page ID is valid (not the sentinel value).
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// Byte offset of this page within its file.
    #[inline]
    pub fn offset(&self) -> u64 {
        (self.0 as u64) * (PAGE_SIZE as u64)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "Page(INVALID)")
        } else {
            write!(f, "Page({})", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_id_invalid() {
        assert!(!PageId::INVALID.is_valid());
        assert!(PageId::new(0).is_valid());
    }

    #[test]
    fn test_page_id_offset() {
        assert_eq!(PageId::new(0).offset(), 0);
        assert_eq!(PageId::new(3).offset(), 3 * PAGE_SIZE as u64);
        // No u32 overflow for large page numbers
        assert_eq!(PageId::new(1 << 20).offset(), (1u64 << 20) * 4096);
    }

    #[test]
    fn test_page_id_display() {
        assert_eq!(format!("{}", PageId::new(42)), "Page(42)");
        assert_eq!(format!("{}", PageId::INVALID), "Page(INVALID)");
    }
}
