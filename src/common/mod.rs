//! Common types shared by the replacer and the disk manager.
//!
//! - Configuration constants and [`DiskManagerConfig`](config::DiskManagerConfig)
//! - Error types
//! - Identifiers (FrameId, PageId, Fd)

pub mod config;
pub mod error;
mod fd;
mod frame_id;
mod page_id;

pub use error::{Error, Result, TransferOp};
pub use fd::Fd;
pub use frame_id::FrameId;
pub use page_id::PageId;
