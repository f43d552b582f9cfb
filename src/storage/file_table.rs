//! Bidirectional fd ↔ path table for open page files.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::common::{Error, Fd, Result};

/// A tracked open file.
///
/// The handle sits behind its own mutex so that a seek and the transfer that
/// follows it happen as one step, while other fds stay unblocked.
pub(crate) struct OpenFile {
    pub(crate) path: PathBuf,
    pub(crate) handle: Arc<Mutex<File>>,
}

/// Table of open files, keyed both ways.
///
/// Invariant: `by_path` and `by_fd` describe the same set of (path, fd) pairs.
/// Every mutation goes through [`insert`](Self::insert) and
/// [`remove`](Self::remove), which update both maps together.
pub(crate) struct FileTable {
    by_path: HashMap<PathBuf, Fd>,
    by_fd: HashMap<Fd, OpenFile>,

    /// Fds returned by `remove`, reused lowest-first.
    released: BTreeSet<Fd>,

    /// Lowest fd never handed out.
    next_fd: u32,

    capacity: usize,
}

impl FileTable {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            by_path: HashMap::new(),
            by_fd: HashMap::new(),
            released: BTreeSet::new(),
            next_fd: 0,
            capacity,
        }
    }

    pub(crate) fn fd_of(&self, path: &Path) -> Option<Fd> {
        self.by_path.get(path).copied()
    }

    pub(crate) fn get(&self, fd: Fd) -> Option<&OpenFile> {
        self.by_fd.get(&fd)
    }

    pub(crate) fn contains_path(&self, path: &Path) -> bool {
        self.by_path.contains_key(path)
    }

    pub(crate) fn len(&self) -> usize {
        self.by_fd.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn is_full(&self) -> bool {
        self.by_fd.len() >= self.capacity
    }

    /// Register an opened file under the lowest free fd.
    ///
    /// If `path` is already tracked, `file` is dropped and the existing fd is
    /// returned, so one path never maps to two fds.
    pub(crate) fn insert(&mut self, path: PathBuf, file: File) -> Result<Fd> {
        if let Some(&fd) = self.by_path.get(&path) {
            return Ok(fd);
        }

        let fd = self.next_free_fd()?;
        self.by_path.insert(path.clone(), fd);
        self.by_fd.insert(
            fd,
            OpenFile {
                path,
                handle: Arc::new(Mutex::new(file)),
            },
        );
        Ok(fd)
    }

    /// Drop both directions of the entry for `fd`.
    pub(crate) fn remove(&mut self, fd: Fd) -> Option<OpenFile> {
        let entry = self.by_fd.remove(&fd)?;
        self.by_path.remove(&entry.path);
        self.released.insert(fd);
        Some(entry)
    }

    /// Remove every entry, leaving the table empty.
    pub(crate) fn drain(&mut self) -> Vec<(Fd, OpenFile)> {
        self.by_path.clear();
        self.released.clear();
        self.next_fd = 0;
        self.by_fd.drain().collect()
    }

    fn next_free_fd(&mut self) -> Result<Fd> {
        if self.is_full() {
            return Err(Error::TooManyOpenFiles(self.capacity));
        }
        if let Some(fd) = self.released.pop_first() {
            return Ok(fd);
        }
        let fd = Fd::new(self.next_fd);
        self.next_fd += 1;
        Ok(fd)
    }
}
