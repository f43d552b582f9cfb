//! Disk Manager - page-addressed file I/O, file lifecycle and the log stream.
//!
//! The [`DiskManager`] handles all direct file operations:
//! - Reading and writing pages of open files
//! - Allocating page numbers per file
//! - Creating, opening, closing and destroying files and directories
//! - Appending to and reading from the log file

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::common::config::DiskManagerConfig;
use crate::common::{Error, Fd, PageId, Result, TransferOp};
use crate::storage::file_table::FileTable;
use crate::storage::DiskStats;

/// Manages page files and the log file for one process.
///
/// # File Layout
/// Every relation is one file with pages laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
/// The log is a separate append-only file with no page structure.
///
/// # Thread Safety
/// - file table: `RwLock`, so open/close/get_file_fd are atomic with respect
///   to each other while lookups run concurrently
/// - each open file: `Mutex`, held for one seek plus one transfer
/// - page counters: one `AtomicU32` per fd slot, no shared lock
/// - log file: `Mutex`
///
/// Construct one `DiskManager` per process and share it by reference.
pub struct DiskManager {
    files: RwLock<FileTable>,

    /// Next page number per fd slot. Never persisted.
    page_counters: Box<[AtomicU32]>,

    /// Lazily opened on the first log read or write.
    log: Mutex<Option<File>>,
    log_path: PathBuf,

    stats: DiskStats,
}

impl DiskManager {
    /// Create a disk manager with the default configuration.
    pub fn new() -> Self {
        Self::with_config(DiskManagerConfig::default())
    }

    /// Create a disk manager with custom limits and log location.
    ///
    /// # Panics
    /// Panics if `config.max_fd` is 0 or does not fit in a `u32`.
    pub fn with_config(config: DiskManagerConfig) -> Self {
        assert!(config.max_fd > 0, "max_fd must be > 0");
        assert!(
            config.max_fd <= u32::MAX as usize,
            "max_fd must fit in a u32"
        );

        let page_counters = (0..config.max_fd).map(|_| AtomicU32::new(0)).collect();

        Self {
            files: RwLock::new(FileTable::new(config.max_fd)),
            page_counters,
            log: Mutex::new(None),
            log_path: config.log_path,
            stats: DiskStats::new(),
        }
    }

    // ========================================================================
    // Page I/O
    // ========================================================================

    /// Write the first `num_bytes` of `buf` to page `page_no` of `fd`.
    ///
    /// # Errors
    /// - `Error::BufferTooSmall` if `num_bytes > buf.len()`
    /// - `Error::FileNotOpen` if `fd` is not tracked
    /// - `Error::Io` if the seek or write fails
    /// - `Error::ShortTransfer` if fewer than `num_bytes` bytes were written
    pub fn write_page(
        &self,
        fd: Fd,
        page_no: PageId,
        buf: &[u8],
        num_bytes: usize,
    ) -> Result<()> {
        check_buffer(buf.len(), num_bytes)?;
        let handle = self.handle(fd)?;
        let mut file = handle.lock();

        file.seek(SeekFrom::Start(page_no.offset()))?;
        let written = retry_interrupted(|| file.write(&buf[..num_bytes]))?;
        drop(file);

        if written != num_bytes {
            return Err(short_page_transfer(
                TransferOp::WritePage,
                fd,
                page_no,
                num_bytes,
                written,
            ));
        }

        log::trace!("wrote {} bytes to {} of {}", num_bytes, page_no, fd);
        self.stats.record_page_write(num_bytes);
        Ok(())
    }

    /// Read `num_bytes` of page `page_no` of `fd` into the front of `buf`.
    ///
    /// # Errors
    /// - `Error::BufferTooSmall` if `num_bytes > buf.len()`
    /// - `Error::FileNotOpen` if `fd` is not tracked
    /// - `Error::Io` if the seek or read fails
    /// - `Error::ShortTransfer` on a short read, including reads past end-of-file
    pub fn read_page(
        &self,
        fd: Fd,
        page_no: PageId,
        buf: &mut [u8],
        num_bytes: usize,
    ) -> Result<()> {
        check_buffer(buf.len(), num_bytes)?;
        let handle = self.handle(fd)?;
        let mut file = handle.lock();

        file.seek(SeekFrom::Start(page_no.offset()))?;
        let read = retry_interrupted(|| file.read(&mut buf[..num_bytes]))?;
        drop(file);

        if read != num_bytes {
            return Err(short_page_transfer(
                TransferOp::ReadPage,
                fd,
                page_no,
                num_bytes,
                read,
            ));
        }

        log::trace!("read {} bytes from {} of {}", num_bytes, page_no, fd);
        self.stats.record_page_read(num_bytes);
        Ok(())
    }

    /// Hand out the next page number of `fd`.
    ///
    /// Concurrent calls on the same fd get distinct, increasing numbers.
    /// Calls on different fds never contend.
    ///
    /// # Errors
    /// - `Error::InvalidFd` if `fd` is outside `[0, max_fd)`
    /// - `Error::PageSpaceExhausted` once the counter reaches `PageId::INVALID`
    pub fn allocate_page(&self, fd: Fd) -> Result<PageId> {
        // The counter stops at INVALID instead of wrapping back to 0.
        let page_no = self
            .counter(fd)?
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_add(1))
            .map_err(|_| {
                log::warn!("page space exhausted for {}", fd);
                Error::PageSpaceExhausted(fd)
            })?;
        Ok(PageId::new(page_no))
    }

    /// Page space is never reclaimed; page numbers stay monotonic.
    pub fn deallocate_page(&self, _page_no: PageId) {}

    /// Page number the next `allocate_page(fd)` will return.
    ///
    /// # Errors
    /// Returns `Error::InvalidFd` if `fd` is outside `[0, max_fd)`.
    pub fn next_page_no(&self, fd: Fd) -> Result<PageId> {
        Ok(PageId::new(self.counter(fd)?.load(Ordering::Relaxed)))
    }

    /// Reset the page counter of `fd`, e.g. from a file header after reopen.
    ///
    /// # Errors
    /// Returns `Error::InvalidFd` if `fd` is outside `[0, max_fd)`.
    pub fn set_next_page_no(&self, fd: Fd, page_no: PageId) -> Result<()> {
        self.counter(fd)?.store(page_no.0, Ordering::Relaxed);
        Ok(())
    }

    // ========================================================================
    // Directory and file lifecycle
    // ========================================================================

    /// Whether `path` is an existing directory. Never fails.
    pub fn is_dir<P: AsRef<Path>>(&self, path: P) -> bool {
        fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
    }

    /// Whether `path` is an existing regular file. Never fails.
    pub fn is_file<P: AsRef<Path>>(&self, path: P) -> bool {
        fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
    }

    /// Create `path` and any missing parents.
    pub fn create_dir<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::create_dir_all(path).map_err(|source| Error::Os {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("created directory {}", path.display());
        Ok(())
    }

    /// Remove `path` and everything below it.
    pub fn destroy_dir<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::remove_dir_all(path).map_err(|source| Error::Os {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("destroyed directory {}", path.display());
        Ok(())
    }

    /// Create an empty file. Never truncates an existing one.
    ///
    /// # Errors
    /// Returns `Error::FileExists` if `path` already exists.
    pub fn create_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|err| match err.kind() {
                ErrorKind::AlreadyExists => Error::FileExists(path.to_path_buf()),
                _ => Error::Io(err),
            })?;
        log::debug!("created file {}", path.display());
        Ok(())
    }

    /// Delete a closed file.
    ///
    /// # Errors
    /// - `Error::FileNotClosed` if `path` is open in this manager, including
    ///   the log file once it has been opened
    /// - `Error::FileNotFound` if the unlink fails
    pub fn destroy_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        // Holding the read lock keeps a concurrent open from slipping in.
        let files = self.files.read();
        let log_open = path == self.log_path && self.log.lock().is_some();
        if files.contains_path(path) || log_open {
            log::warn!("refusing to destroy open file {}", path.display());
            return Err(Error::FileNotClosed(path.to_path_buf()));
        }
        fs::remove_file(path).map_err(|_| Error::FileNotFound(path.to_path_buf()))?;
        drop(files);

        log::debug!("destroyed file {}", path.display());
        Ok(())
    }

    /// Open `path` for reading and writing, or return its fd if already open.
    ///
    /// # Errors
    /// - `Error::FileNotFound` if `path` is not an existing file
    /// - `Error::TooManyOpenFiles` if the file table is full
    pub fn open_file<P: AsRef<Path>>(&self, path: P) -> Result<Fd> {
        let path = path.as_ref();
        if !self.is_file(path) {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let mut files = self.files.write();
        self.open_tracked(&mut files, path)
    }

    /// Close `fd`. Untracked fds are ignored.
    ///
    /// The handle is synced before release; if that fails the file stays
    /// open and tracked.
    ///
    /// # Errors
    /// Returns `Error::Io` if the sync fails.
    pub fn close_file(&self, fd: Fd) -> Result<()> {
        let Ok(handle) = self.handle(fd) else {
            return Ok(());
        };
        // Sync with the table unlocked so I/O on other fds keeps flowing.
        handle.lock().sync_all()?;

        let mut files = self.files.write();
        // A racing close (and reopen) may have replaced the entry meanwhile.
        let same_file = files
            .get(fd)
            .is_some_and(|entry| Arc::ptr_eq(&entry.handle, &handle));
        if same_file {
            if let Some(entry) = files.remove(fd) {
                log::debug!("closed {} ({})", fd, entry.path.display());
            }
        }
        Ok(())
    }

    /// Size of `path` in bytes, or `None` if it cannot be stat'ed.
    pub fn get_file_size<P: AsRef<Path>>(&self, path: P) -> Option<u64> {
        fs::metadata(path).ok().map(|m| m.len())
    }

    /// Path that `fd` was opened with.
    ///
    /// # Errors
    /// Returns `Error::FileNotOpen` if `fd` is not tracked.
    pub fn get_file_name(&self, fd: Fd) -> Result<PathBuf> {
        self.files
            .read()
            .get(fd)
            .map(|entry| entry.path.clone())
            .ok_or(Error::FileNotOpen(fd))
    }

    /// Fd of `path`, opening it first if needed.
    ///
    /// # Errors
    /// Same as [`open_file`](Self::open_file) when the file is not yet open.
    pub fn get_file_fd<P: AsRef<Path>>(&self, path: P) -> Result<Fd> {
        let path = path.as_ref();
        let mut files = self.files.write();
        if let Some(fd) = files.fd_of(path) {
            return Ok(fd);
        }
        if !self.is_file(path) {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        self.open_tracked(&mut files, path)
    }

    /// Whether `path` is currently open in this manager.
    pub fn is_open<P: AsRef<Path>>(&self, path: P) -> bool {
        self.files.read().contains_path(path.as_ref())
    }

    /// Number of tracked open files.
    pub fn open_file_count(&self) -> usize {
        self.files.read().len()
    }

    /// Flush `fd`'s data and metadata to disk.
    ///
    /// # Errors
    /// - `Error::FileNotOpen` if `fd` is not tracked
    /// - `Error::Io` if the sync fails
    pub fn sync_file(&self, fd: Fd) -> Result<()> {
        self.handle(fd)?.lock().sync_all()?;
        Ok(())
    }

    // ========================================================================
    // Log I/O
    // ========================================================================

    /// Append the first `size` bytes of `data` to the log.
    ///
    /// # Errors
    /// - `Error::BufferTooSmall` if `size > data.len()`
    /// - `Error::Io` if the log cannot be opened or written
    /// - `Error::ShortTransfer` if fewer than `size` bytes were appended
    pub fn write_log(&self, data: &[u8], size: usize) -> Result<()> {
        check_buffer(data.len(), size)?;
        self.with_log(|file| {
            // Opened in append mode: every write lands at end-of-file.
            let written = retry_interrupted(|| file.write(&data[..size]))?;
            if written != size {
                log::warn!("short log append: {} of {} bytes", written, size);
                return Err(Error::ShortTransfer {
                    op: TransferOp::WriteLog,
                    expected: size,
                    actual: written,
                });
            }
            Ok(())
        })?;

        log::trace!("appended {} bytes to log", size);
        self.stats.record_log_write(size);
        Ok(())
    }

    /// Read up to `size` log bytes starting at `offset` into `data`.
    ///
    /// Returns `Ok(None)` if `offset` lies past the end of the log (nothing new
    /// yet), otherwise the number of bytes read, which is
    /// `min(size, log_len - offset)` and may be 0.
    ///
    /// # Errors
    /// - `Error::BufferTooSmall` if `size > data.len()`
    /// - `Error::Io` if the log cannot be opened or read
    /// - `Error::ShortTransfer` if the clamped read comes back short
    pub fn read_log(&self, data: &mut [u8], size: usize, offset: u64) -> Result<Option<usize>> {
        check_buffer(data.len(), size)?;
        let read = self.with_log(|file| {
            let log_len = file.metadata()?.len();
            if offset > log_len {
                return Ok(None);
            }

            let size = size.min((log_len - offset) as usize);
            if size == 0 {
                return Ok(Some(0));
            }

            file.seek(SeekFrom::Start(offset))?;
            let read = retry_interrupted(|| file.read(&mut data[..size]))?;
            if read != size {
                return Err(Error::ShortTransfer {
                    op: TransferOp::ReadLog,
                    expected: size,
                    actual: read,
                });
            }
            Ok(Some(read))
        })?;

        if let Some(n) = read {
            self.stats.record_log_read(n);
        }
        Ok(read)
    }

    /// Flush the log to disk. No-op if the log was never opened.
    pub fn sync_log(&self) -> Result<()> {
        if let Some(file) = self.log.lock().as_ref() {
            file.sync_all()?;
        }
        Ok(())
    }

    /// Location of the log file.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Transfer counters.
    pub fn stats(&self) -> &DiskStats {
        &self.stats
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn handle(&self, fd: Fd) -> Result<Arc<Mutex<File>>> {
        self.files
            .read()
            .get(fd)
            .map(|entry| Arc::clone(&entry.handle))
            .ok_or(Error::FileNotOpen(fd))
    }

    fn counter(&self, fd: Fd) -> Result<&AtomicU32> {
        self.page_counters
            .get(fd.index())
            .ok_or(Error::InvalidFd(fd))
    }

    /// Open `path` under the caller's write lock, reusing a tracked fd.
    fn open_tracked(&self, files: &mut FileTable, path: &Path) -> Result<Fd> {
        if let Some(fd) = files.fd_of(path) {
            return Ok(fd);
        }
        if files.is_full() {
            log::warn!("file table full, cannot open {}", path.display());
            return Err(Error::TooManyOpenFiles(files.capacity()));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
                _ => Error::Io(err),
            })?;
        let fd = files.insert(path.to_path_buf(), file)?;

        log::debug!("opened {} as {}", path.display(), fd);
        Ok(fd)
    }

    fn with_log<T>(&self, op: impl FnOnce(&mut File) -> Result<T>) -> Result<T> {
        let mut slot = self.log.lock();
        let file = match slot.take() {
            Some(file) => file,
            None => {
                let file = OpenOptions::new()
                    .read(true)
                    .append(true)
                    .create(true)
                    .open(&self.log_path)?;
                log::debug!("opened log {}", self.log_path.display());
                file
            }
        };
        op(slot.insert(file))
    }
}

impl Default for DiskManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DiskManager {
    fn drop(&mut self) {
        for (fd, entry) in self.files.get_mut().drain() {
            if let Err(err) = entry.handle.lock().sync_all() {
                log::warn!(
                    "sync of {} ({}) failed on shutdown: {}",
                    fd,
                    entry.path.display(),
                    err
                );
            }
        }
    }
}

fn check_buffer(available: usize, requested: usize) -> Result<()> {
    if requested > available {
        return Err(Error::BufferTooSmall {
            requested,
            available,
        });
    }
    Ok(())
}

/// Run one transfer, repeating it only if the syscall was interrupted.
fn retry_interrupted(mut op: impl FnMut() -> io::Result<usize>) -> io::Result<usize> {
    loop {
        match op() {
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}

fn short_page_transfer(
    op: TransferOp,
    fd: Fd,
    page_no: PageId,
    expected: usize,
    actual: usize,
) -> Error {
    log::warn!("{} on {} of {}: {} of {} bytes", op, page_no, fd, actual, expected);
    Error::ShortTransfer {
        op,
        expected,
        actual,
    }
}
