//! Buffer frame replacement.
//!
//! The buffer pool that owns frame bytes, dirty bits and pin counts lives
//! outside this crate. It reports pin-count transitions to a [`Replacer`]
//! and asks it for a victim when no free frame is left.
//!
//! # Components
//! - [`Replacer`] - Eviction policy interface
//! - [`LruReplacer`] - Least-recently-unpinned policy

pub mod replacer;

pub use replacer::{LruReplacer, Replacer};
