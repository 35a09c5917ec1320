//! Cross-process lock over the shared cache.
//!
//! The lock is a JSON record at `<home>/lock.json`. The holder rewrites it on
//! a fixed heartbeat; a waiter treats a record whose modification time is
//! older than the staleness threshold as abandoned and takes over. A live
//! holder blocks waiters indefinitely.
//!
//! Within one process every [`CacheLock`] over the same home shares a single
//! state, so acquiring is idempotent no matter which instance is used.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::sync::{Arc, LazyLock, Mutex, PoisonError, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::util::fs::normalize_path;

/// File name of the lock record, relative to the berth home.
pub const LOCK_FILE: &str = "lock.json";

const LOCK_COMMENT: &str = "File managed by berth";

/// Exit status after an interrupt released the lock.
pub const INTERRUPTED_EXIT: i32 = 130;

/// Live lock states in this process, by record path.
static LOCKS: LazyLock<Mutex<HashMap<PathBuf, Weak<Inner>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Errors acquiring the cache lock.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("failed to inspect lock file: {}", path.display())]
    Inspect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write lock file: {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize lock record")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to start lock heartbeat")]
    Spawn(#[source] io::Error),

    #[error("failed to install interrupt handler")]
    Signal(#[source] ctrlc::Error),
}

/// The on-disk lock descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    pub comment: String,
    pub pid: u32,
    /// RFC 3339 timestamp with nanoseconds
    pub time: String,
}

impl LockRecord {
    /// A record for this process at the current time.
    pub fn now() -> Self {
        LockRecord {
            comment: LOCK_COMMENT.to_string(),
            pid: std::process::id(),
            time: Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true),
        }
    }

    /// Read a record from disk.
    pub fn read(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }
}

/// Timing of the lock protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockOptions {
    /// Interval between checks while waiting
    pub poll: Duration,
    /// Age after which an unrefreshed record is abandoned
    pub stale_after: Duration,
    /// Interval between record rewrites while held
    pub heartbeat: Duration,
}

impl Default for LockOptions {
    fn default() -> Self {
        LockOptions {
            poll: Duration::from_secs(1),
            stale_after: Duration::from_secs(15),
            heartbeat: Duration::from_secs(10),
        }
    }
}

impl LockOptions {
    /// Polls allowed to observe one unchanged modification time before the
    /// record counts as stale regardless of clock readings.
    fn max_unchanged_polls(&self) -> u128 {
        let poll = self.poll.as_millis().max(1);
        self.stale_after.as_millis() / poll + 1
    }
}

/// Advisory lock on a shared cache directory.
///
/// Clones, and any other instance over the same home, share state:
/// acquiring through any of them while the lock is held returns immediately,
/// and the lock is released when the last one is dropped.
#[derive(Debug, Clone)]
pub struct CacheLock {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    path: PathBuf,
    options: LockOptions,
    /// Serializes waiters so only one of them polls the record
    acquiring: Mutex<()>,
    heartbeat: Mutex<Option<Heartbeat>>,
}

#[derive(Debug)]
struct Heartbeat {
    stop: SyncSender<()>,
    handle: JoinHandle<()>,
}

impl CacheLock {
    /// Create a lock over `<home>/lock.json` with default timing.
    pub fn new(home: &Path) -> Self {
        Self::with_options(home, LockOptions::default())
    }

    /// Create a lock with custom timing.
    ///
    /// If this process already has a lock over `home`, the new instance
    /// shares it and keeps its timing.
    pub fn with_options(home: &Path, options: LockOptions) -> Self {
        let path = normalize_path(&home.join(LOCK_FILE));
        let mut locks = LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(inner) = locks.get(&path).and_then(Weak::upgrade) {
            return CacheLock { inner };
        }

        locks.retain(|_, inner| inner.strong_count() > 0);
        let inner = Arc::new(Inner {
            path: path.clone(),
            options,
            acquiring: Mutex::new(()),
            heartbeat: Mutex::new(None),
        });
        locks.insert(path, Arc::downgrade(&inner));
        CacheLock { inner }
    }

    /// Path of the lock record.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Whether this process currently holds the lock.
    pub fn is_held(&self) -> bool {
        self.inner
            .heartbeat
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Wait for the lock and take it.
    ///
    /// Returns immediately if this process already holds it. Blocks while
    /// another live process holds it.
    pub fn acquire(&self) -> Result<(), LockError> {
        if self.is_held() {
            return Ok(());
        }
        let _acquiring = self
            .inner
            .acquiring
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.is_held() {
            return Ok(());
        }

        wait_on_lock(&self.inner.path, &self.inner.options)?;

        let mut heartbeat = self
            .inner
            .heartbeat
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if heartbeat.is_some() {
            return Ok(());
        }
        write_record(&self.inner.path)?;
        *heartbeat = Some(start_heartbeat(
            self.inner.path.clone(),
            self.inner.options.heartbeat,
        )?);
        debug!("acquired cache lock {}", self.inner.path.display());
        Ok(())
    }

    /// Stop the heartbeat and remove the record. Does nothing unless held.
    pub fn release(&self) {
        self.inner.release();
    }

    /// Release the lock and exit with [`INTERRUPTED_EXIT`] when the process
    /// receives Ctrl-C or a termination signal.
    ///
    /// The handler is process-wide and can be installed once. It does not
    /// keep the lock alive.
    pub fn release_on_interrupt(&self) -> Result<(), LockError> {
        let inner = Arc::downgrade(&self.inner);
        ctrlc::set_handler(move || {
            if let Some(inner) = inner.upgrade() {
                inner.interrupted();
            }
            std::process::exit(INTERRUPTED_EXIT);
        })
        .map_err(LockError::Signal)
    }
}

impl Inner {
    fn release(&self) {
        let held = self
            .heartbeat
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(heartbeat) = held else {
            return;
        };

        let _ = heartbeat.stop.send(());
        if heartbeat.handle.join().is_err() {
            error!("cache lock heartbeat panicked");
        }
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => error!("failed to remove {}: {}", self.path.display(), e),
        }
        debug!("released cache lock {}", self.path.display());
    }

    fn interrupted(&self) {
        let held = self
            .heartbeat
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        if held {
            info!("Interrupted, releasing berth cache lock");
        }
        self.release();
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.release();
    }
}

fn wait_on_lock(path: &Path, options: &LockOptions) -> Result<(), LockError> {
    let mut announced = false;
    let mut last_seen: Option<SystemTime> = None;
    let mut unchanged = 0u128;

    loop {
        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(LockError::Inspect {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let modified = meta.modified().map_err(|source| LockError::Inspect {
            path: path.to_path_buf(),
            source,
        })?;

        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or_default();
        if age > options.stale_after {
            debug!("lock file is {}s old, taking over", age.as_secs());
            return Ok(());
        }

        if last_seen == Some(modified) {
            unchanged += 1;
            if unchanged >= options.max_unchanged_polls() {
                debug!("lock file was not refreshed, taking over");
                return Ok(());
            }
        } else {
            last_seen = Some(modified);
            unchanged = 0;
        }

        if !announced {
            announced = true;
            info!("Waiting on berth global cache access");
        }
        thread::sleep(options.poll);
    }
}

fn write_record(path: &Path) -> Result<(), LockError> {
    let write_err = |source| LockError::Write {
        path: path.to_path_buf(),
        source,
    };

    let data = serde_json::to_vec(&LockRecord::now()).map_err(LockError::Serialize)?;
    let dir = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(&data).map_err(write_err)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o755))
            .map_err(write_err)?;
    }
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

fn start_heartbeat(path: PathBuf, interval: Duration) -> Result<Heartbeat, LockError> {
    let (stop, stopped) = mpsc::sync_channel::<()>(1);
    let handle = thread::Builder::new()
        .name("berth-lock-heartbeat".to_string())
        .spawn(move || {
            run_heartbeat(
                &stopped,
                interval,
                || write_record(&path),
                |e| {
                    // The record no longer proves a live holder
                    error!("Error using berth lock: {:#}", anyhow::Error::new(e));
                    std::process::exit(1);
                },
            )
        })
        .map_err(LockError::Spawn)?;
    Ok(Heartbeat { stop, handle })
}

/// Refresh the record every `interval` until `stopped` fires. The first
/// failed refresh is handed to `on_failure` and ends the loop.
fn run_heartbeat(
    stopped: &Receiver<()>,
    interval: Duration,
    mut refresh: impl FnMut() -> Result<(), LockError>,
    on_failure: impl FnOnce(LockError),
) {
    loop {
        match stopped.recv_timeout(interval) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
            Err(RecvTimeoutError::Timeout) => {
                if let Err(e) = refresh() {
                    on_failure(e);
                    return;
                }
            }
        }
    }
}
