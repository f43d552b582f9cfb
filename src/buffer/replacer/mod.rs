//! Eviction policy implementations (replacers).
//!
//! Currently implements:
//! - [`LruReplacer`] - evicts the least recently unpinned frame

mod lru_replacer;

pub use lru_replacer::LruReplacer;

use crate::common::FrameId;

/// Decides which unpinned frame a buffer pool reclaims under memory pressure.
///
/// Implementations synchronize internally, so every method takes `&self` and a
/// single replacer can be shared across threads behind an `Arc`.
pub trait Replacer: Send + Sync {
    /// Remove and return the frame to evict, or `None` if no frame is evictable.
    fn victim(&self) -> Option<FrameId>;

    /// Mark a frame as in use. No-op for untracked frames.
    fn pin(&self, frame_id: FrameId);

    /// Mark a frame as evictable. No-op if it is already tracked.
    fn unpin(&self, frame_id: FrameId);

    /// Number of evictable frames.
    fn size(&self) -> usize;
}
