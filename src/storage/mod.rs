//! Storage layer - disk I/O for page files and the log stream.
//!
//! - [`DiskManager`] - page I/O, file table, page counters, log stream
//! - [`DiskStats`] - transfer counters

mod disk_manager;
mod file_table;
mod stats;

pub use disk_manager::DiskManager;
pub use stats::{DiskStats, StatsSnapshot};
