//! Locks used by the driver.
//!
//! - [`LockRegistry`] hands out one in-process mutex per collection.
//! - [`RootLock`] holds an advisory `flock` on the store root so that a
//!   second process can't drive the same directory at the same time.
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};

use cluFlock::{element::FlockElement, ExclusiveFlock, FlockLock};

#[cfg(unix)]
use std::os::unix::io::{AsRawFd, RawFd};
#[cfg(windows)]
use std::os::windows::io::{AsRawHandle, RawHandle};

/// Name of the advisory lock file inside the store root.
pub const ROOT_LOCK_FILE: &str = ".jsondb.lock";

/// Per-collection exclusive locks.
///
/// The registry mutex is only held while looking up or inserting an entry.
/// Callers lock the returned handle themselves, so collections never wait
/// on each other.
#[derive(Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the lock of `collection`, registering a fresh one on first use.
    /// Every call with the same name yields the same instance.
    pub fn get_or_create(&self, collection: &str) -> Arc<Mutex<()>> {
        // a panic while holding the guard can't leave the map half-updated
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(lock) = locks.get(collection) {
            return Arc::clone(lock);
        }
        let lock = Arc::new(Mutex::new(()));
        locks.insert(collection.to_owned(), Arc::clone(&lock));
        lock
    }

    /// Number of collections that have been locked at least once.
    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

struct LockFile {
    file: File,
}

#[cfg(unix)]
impl FlockElement for LockFile {
    type FilePtr = RawFd;

    fn as_file_ptr(&self) -> Self::FilePtr {
        AsRawFd::as_raw_fd(&self.file)
    }
}

#[cfg(windows)]
impl FlockElement for LockFile {
    type FilePtr = RawHandle;

    fn as_file_ptr(&self) -> Self::FilePtr {
        AsRawHandle::as_raw_handle(&self.file)
    }
}

/// Exclusive advisory lock over a store root.
///
/// Taken by blocking until no other holder is left. The lock is released
/// when `RootLock` is dropped.
pub struct RootLock {
    path: PathBuf,
    _inner: FlockLock<LockFile>,
}

impl RootLock {
    pub fn acquire(root: &Path) -> Result<Self> {
        let path = root.join(ROOT_LOCK_FILE);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .with_context(|| format!("can't open lock file {:?}", path))?;
        let inner = ExclusiveFlock::wait_lock(LockFile { file })
            .map_err(|e| e.into_err())
            .with_context(|| format!("can't lock {:?}", path))?;
        Ok(RootLock {
            path,
            _inner: inner,
        })
    }

    #[cfg(test)]
    fn path(&self) -> &Path {
        &self.path
    }
}
