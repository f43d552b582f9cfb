//! LRU (Least Recently Unpinned) replacement policy.

use lru::LruCache;
use parking_lot::Mutex;

use super::Replacer;
use crate::common::FrameId;

/// Evicts the frame that has been unpinned the longest.
///
/// Recency is measured from the `unpin` that made a frame evictable. A second
/// `unpin` of an already tracked frame does not refresh its position.
///
/// # Data structure
/// ```text
///   unpin ──▶ [ MRU ] ⇄ [ ... ] ⇄ [ LRU ] ──▶ victim
///                 ▲                   ▲
///                 └──── hash index ───┘   FrameId → list node
/// ```
/// `LruCache` pairs a hash map with an intrusive doubly linked list, so
/// `unpin`, `pin`, `victim` and `size` are all O(1).
///
/// # Thread Safety
/// One mutex guards the list and the index together, so their key sets never
/// diverge and two concurrent `victim` calls never return the same frame.
pub struct LruReplacer {
    evictable: Mutex<LruCache<FrameId, ()>>,

    /// Number of frames in the pool this replacer serves.
    capacity: usize,
}

impl LruReplacer {
    /// Create a replacer for a pool of `capacity` frames.
    ///
    /// The capacity sizes expectations only; tracking more frames than that
    /// is logged but not rejected.
    pub fn new(capacity: usize) -> Self {
        Self {
            evictable: Mutex::new(LruCache::unbounded()),
            capacity,
        }
    }

    /// Pool capacity given at construction.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Replacer for LruReplacer {
    fn victim(&self) -> Option<FrameId> {
        let (frame_id, ()) = self.evictable.lock().pop_lru()?;
        log::trace!("lru replacer evicts {}", frame_id);
        Some(frame_id)
    }

    fn pin(&self, frame_id: FrameId) {
        self.evictable.lock().pop(&frame_id);
    }

    fn unpin(&self, frame_id: FrameId) {
        let mut evictable = self.evictable.lock();
        // `contains` does not touch recency; `put` would.
        if evictable.contains(&frame_id) {
            return;
        }
        evictable.put(frame_id, ());
        let tracked = evictable.len();
        drop(evictable);

        if tracked > self.capacity {
            log::warn!(
                "lru replacer tracks {} frames, above pool capacity {}",
                tracked,
                self.capacity
            );
        }
    }

    fn size(&self) -> usize {
        self.evictable.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fid(id: usize) -> FrameId {
        FrameId::new(id)
    }

    #[test]
    fn test_lru_sample() {
        let replacer = LruReplacer::new(7);

        for id in 1..=6 {
            replacer.unpin(fid(id));
        }
        // Duplicate unpin leaves the order untouched
        replacer.unpin(fid(1));
        assert_eq!(replacer.size(), 6);

        assert_eq!(replacer.victim(), Some(fid(1)));
        assert_eq!(replacer.victim(), Some(fid(2)));
        assert_eq!(replacer.victim(), Some(fid(3)));

        // Pinning an evicted frame is a no-op; pinning a tracked one removes it
        replacer.pin(fid(3));
        replacer.pin(fid(4));
        assert_eq!(replacer.size(), 2);

        replacer.unpin(fid(4));
        assert_eq!(replacer.victim(), Some(fid(5)));
        assert_eq!(replacer.victim(), Some(fid(6)));
        assert_eq!(replacer.victim(), Some(fid(4)));
        assert_eq!(replacer.victim(), None);
    }

    #[test]
    fn test_victim_on_empty() {
        let replacer = LruReplacer::new(4);
        assert_eq!(replacer.victim(), None);
        assert_eq!(replacer.size(), 0);

        // Still usable afterwards
        replacer.unpin(fid(0));
        assert_eq!(replacer.victim(), Some(fid(0)));
    }

    #[test]
    fn test_unpin_is_idempotent() {
        let replacer = LruReplacer::new(4);
        replacer.unpin(fid(0));
        replacer.unpin(fid(1));
        replacer.unpin(fid(0));

        assert_eq!(replacer.size(), 2);
        assert_eq!(replacer.victim(), Some(fid(0)));
        assert_eq!(replacer.victim(), Some(fid(1)));
    }

    #[test]
    fn test_pin_untracked_is_noop() {
        let replacer = LruReplacer::new(4);
        replacer.unpin(fid(2));
        replacer.pin(fid(9));

        assert_eq!(replacer.size(), 1);
        assert_eq!(replacer.victim(), Some(fid(2)));
    }

    #[test]
    fn test_repin_moves_to_back() {
        let replacer = LruReplacer::new(4);
        replacer.unpin(fid(0));
        replacer.unpin(fid(1));

        // Pin then unpin makes frame 0 the most recently unpinned
        replacer.pin(fid(0));
        replacer.unpin(fid(0));

        assert_eq!(replacer.victim(), Some(fid(1)));
        assert_eq!(replacer.victim(), Some(fid(0)));
    }

    mod warn_outside_lock {
        use super::*;
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::OnceLock;
        use std::thread::{self, ThreadId};

        static REPLACER: OnceLock<LruReplacer> = OnceLock::new();
        static TEST_THREAD: OnceLock<ThreadId> = OnceLock::new();
        static WARNED: AtomicBool = AtomicBool::new(false);
        static WARNED_UNDER_LOCK: AtomicBool = AtomicBool::new(false);

        /// Records whether the replacer mutex was free when a warning was emitted.
        struct LockCheckLogger;

        impl log::Log for LockCheckLogger {
            fn enabled(&self, _: &log::Metadata) -> bool {
                true
            }

            fn log(&self, record: &log::Record) {
                // Unit tests run in parallel; only look at this test's thread.
                if record.level() != log::Level::Warn
                    || TEST_THREAD.get() != Some(&thread::current().id())
                {
                    return;
                }
                if let Some(replacer) = REPLACER.get() {
                    WARNED.store(true, Ordering::SeqCst);
                    if replacer.evictable.try_lock().is_none() {
                        WARNED_UNDER_LOCK.store(true, Ordering::SeqCst);
                    }
                }
            }

            fn flush(&self) {}
        }

        static LOGGER: LockCheckLogger = LockCheckLogger;

        #[test]
        fn test_over_capacity_warning_is_logged_unlocked() {
            TEST_THREAD.get_or_init(|| thread::current().id());
            let replacer = REPLACER.get_or_init(|| LruReplacer::new(1));
            log::set_logger(&LOGGER).unwrap();
            log::set_max_level(log::LevelFilter::Warn);

            replacer.unpin(fid(0));
            replacer.unpin(fid(1));

            assert!(WARNED.load(Ordering::SeqCst));
            assert!(!WARNED_UNDER_LOCK.load(Ordering::SeqCst));
            assert_eq!(replacer.size(), 2);
        }
    }

    #[test]
    fn test_over_capacity_is_tolerated() {
        let replacer = LruReplacer::new(2);
        for id in 0..5 {
            replacer.unpin(fid(id));
        }
        assert_eq!(replacer.capacity(), 2);
        assert_eq!(replacer.size(), 5);
        assert_eq!(replacer.victim(), Some(fid(0)));
    }
}
