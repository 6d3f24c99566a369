//! # State File Lock
//!
//! Uses `fs2` for cross-platform file locking (flock on Unix, LockFile on Windows).
//!
//! The lock lives next to the state file as `<state file>.lock` and is held
//! for as long as the world state is open.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use car_contract::errors::StateError;
use fs2::FileExt;
use thiserror::Error;

/// How long `acquire` keeps retrying before giving up.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_RETRY_DELAY: Duration = Duration::from_millis(500);

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors from state file locking.
#[derive(Debug, Error)]
pub enum LockError {
    /// Lock file could not be created or opened.
    #[error("failed to create lock file {path}: {source}")]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Another process kept the lock past the timeout.
    #[error("{}", already_locked_message(.pid, .path))]
    AlreadyLocked { pid: Option<u32>, path: PathBuf },

    /// Failed to record the owner PID.
    #[error("failed to write PID to lock file: {0}")]
    WriteFailed(#[source] io::Error),
}

fn already_locked_message(pid: &Option<u32>, path: &Path) -> String {
    match pid {
        Some(pid) => format!("state already in use by process {pid} ({})", path.display()),
        None => format!("state already in use ({})", path.display()),
    }
}

impl From<LockError> for StateError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::AlreadyLocked { .. } => StateError::Unavailable(err.to_string()),
            LockError::CreateFailed { .. } | LockError::WriteFailed(_) => {
                StateError::Io(err.to_string())
            }
        }
    }
}

// =============================================================================
// STATE LOCK
// =============================================================================

/// Exclusive lock on a state file, released on drop (RAII).
///
/// ```ignore
/// let lock = StateLock::acquire(Path::new("/data/world-state.json"), DEFAULT_LOCK_TIMEOUT)?;
/// // Lock is held until `lock` goes out of scope
/// ```
#[derive(Debug)]
pub struct StateLock {
    /// Kept open to maintain the lock.
    file: File,
    path: PathBuf,
    pid: u32,
}

impl StateLock {
    /// Lock file path for `state_path`.
    #[must_use]
    pub fn lock_path(state_path: &Path) -> PathBuf {
        let mut name = state_path.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Acquire the lock for `state_path`.
    ///
    /// Retries with exponential backoff until `timeout` expires.
    ///
    /// # Errors
    ///
    /// Returns `LockError::AlreadyLocked` if another handle keeps the lock
    /// past the timeout.
    pub fn acquire(state_path: &Path, timeout: Duration) -> Result<Self, LockError> {
        let lock_path = Self::lock_path(state_path);
        let deadline = Instant::now() + timeout;
        let mut retry_delay = Duration::from_millis(20);

        if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| LockError::CreateFailed {
                path: lock_path.clone(),
                source,
            })?;
        }

        loop {
            // Not truncated: the holder's PID must stay readable.
            let mut file = OpenOptions::new()
                .create(true)
                .read(true)
                .write(true)
                .truncate(false)
                .open(&lock_path)
                .map_err(|source| LockError::CreateFailed {
                    path: lock_path.clone(),
                    source,
                })?;

            if file.try_lock_exclusive().is_ok() {
                let pid = std::process::id();
                file.set_len(0).map_err(LockError::WriteFailed)?;
                writeln!(file, "{pid}").map_err(LockError::WriteFailed)?;
                file.sync_all().map_err(LockError::WriteFailed)?;
                return Ok(Self {
                    file,
                    path: lock_path,
                    pid,
                });
            }

            if Instant::now() >= deadline {
                return Err(LockError::AlreadyLocked {
                    pid: Self::read_existing_pid(&lock_path),
                    path: lock_path,
                });
            }

            drop(file);
            std::thread::sleep(retry_delay);
            retry_delay = (retry_delay * 2).min(MAX_RETRY_DELAY);
        }
    }

    /// PID of the process holding the lock.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_existing_pid(path: &Path) -> Option<u32> {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        // The file itself stays; removing it would let a waiter lock a stale inode.
        let _ = self.file.unlock();
    }
}

// =============================================================================
// TESTS
// =============================================================================
