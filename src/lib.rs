//! pagestore - the paging core of a disk-based storage engine.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │              Buffer Pool Manager (external caller)              │
//! │        pin / unpin / victim        page I/O, files, log         │
//! └───────────────┬─────────────────────────────┬───────────────────┘
//!                 ↓                             ↓
//! ┌───────────────────────────────┐ ┌───────────────────────────────┐
//! │   Eviction Policy (buffer/)   │ │   Disk Manager (storage/)     │
//! │   LruReplacer: O(1) LRU over  │ │   fd ↔ path table             │
//! │   unpinned frame ids          │ │   per-fd page counters        │
//! │                               │ │   page_no × PAGE_SIZE I/O     │
//! │                               │ │   append-only log stream      │
//! └───────────────────────────────┘ └───────────────────────────────┘
//! ```
//! The two components never call each other.
//!
//! # Modules
//! - [`common`] - Shared primitives (FrameId, PageId, Fd, Error, config)
//! - [`buffer`] - Eviction policies
//! - [`storage`] - Disk I/O
//!
//! # Quick Start
//! ```no_run
//! use pagestore::{DiskManager, PageId};
//!
//! let dm = DiskManager::new();
//! dm.create_file("t1").unwrap();
//! let fd = dm.open_file("t1").unwrap();
//!
//! let page_no = dm.allocate_page(fd).unwrap();
//! assert_eq!(page_no, PageId::new(0));
//! dm.write_page(fd, page_no, b"AAAA", 4).unwrap();
//! ```

pub mod buffer;
pub mod common;
pub mod storage;

pub use common::config::{DiskManagerConfig, LOG_FILE_NAME, MAX_FD, PAGE_SIZE};
pub use common::{Error, Fd, FrameId, PageId, Result};

pub use buffer::{LruReplacer, Replacer};
pub use storage::{DiskManager, DiskStats};
