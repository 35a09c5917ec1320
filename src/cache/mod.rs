//! The shared on-disk cache.
//!
//! Layout under the berth home:
//!
//! ```text
//! <home>/lock.json           cross-process lock record
//! <home>/cache/src/<key>     repository checkouts
//! <home>/cache/info/<key>.json
//! ```

pub mod lock;
pub mod versions;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

pub use lock::{CacheLock, LockError, LockOptions, LockRecord};
pub use versions::VersionCache;

/// `user@host:path`, as accepted by git and ssh.
static SCP_SYNTAX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z0-9_]+)@([a-zA-Z0-9._-]+):(.*)$").expect("scp pattern is valid")
});

/// Errors using the cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache disabled")]
    Disabled,

    #[error("failed to access cache path: {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid repository info: {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Metadata kept about a cached repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    #[serde(rename = "default-branch", default)]
    pub default_branch: String,
    #[serde(rename = "last-update", default)]
    pub last_update: String,
}

/// The berth home and its cache directories.
#[derive(Debug)]
pub struct CacheHome {
    home: PathBuf,
    enabled: bool,
    is_setup: AtomicBool,
}

impl CacheHome {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        CacheHome {
            home: home.into(),
            enabled: true,
            is_setup: AtomicBool::new(false),
        }
    }

    /// Turn the cache on or off.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// `<home>/cache`
    pub fn cache_dir(&self) -> PathBuf {
        self.home.join("cache")
    }

    /// `<home>/cache/src`
    pub fn src_dir(&self) -> PathBuf {
        self.cache_dir().join("src")
    }

    /// `<home>/cache/info`
    pub fn info_dir(&self) -> PathBuf {
        self.cache_dir().join("info")
    }

    /// Checkout location for a cache key.
    pub fn repo_dir(&self, key: &str) -> PathBuf {
        self.src_dir().join(key)
    }

    /// The lock over this home. It shares state with every other lock over
    /// the same home in this process.
    pub fn lock(&self) -> CacheLock {
        CacheLock::new(&self.home)
    }

    /// Create the cache directories. Only the first successful call touches
    /// the filesystem.
    pub fn setup(&self) -> Result<(), CacheError> {
        if self.is_setup.load(Ordering::Acquire) {
            return Ok(());
        }
        debug!("Setting up the cache directory");
        for dir in [self.cache_dir(), self.src_dir(), self.info_dir()] {
            fs::create_dir_all(&dir).map_err(|source| CacheError::Io { path: dir, source })?;
        }
        self.is_setup.store(true, Ordering::Release);
        Ok(())
    }

    fn info_path(&self, key: &str) -> PathBuf {
        self.info_dir().join(format!("{}.json", key))
    }

    /// Save metadata for a repository, stamping the update time.
    pub fn save_repo_info(&self, key: &str, info: &RepoInfo) -> Result<(), CacheError> {
        if !self.enabled {
            return Err(CacheError::Disabled);
        }
        self.setup()?;

        let mut info = info.clone();
        info.last_update = Utc::now().to_rfc3339();
        let path = self.info_path(key);
        let data = serde_json::to_vec(&info).map_err(|source| CacheError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, data).map_err(|source| CacheError::Io { path, source })
    }

    /// Load metadata for a repository. Missing metadata is empty.
    pub fn repo_info(&self, key: &str) -> Result<RepoInfo, CacheError> {
        if !self.enabled {
            return Err(CacheError::Disabled);
        }
        self.setup()?;

        let path = self.info_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(RepoInfo::default()),
            Err(source) => return Err(CacheError::Io { path, source }),
        };
        serde_json::from_str(&content).map_err(|source| CacheError::Json { path, source })
    }
}

/// Turn a repository location into a directory-safe cache key.
///
/// ```
/// use berth::cache::key;
///
/// assert_eq!(key("https://github.com/foo/bar"), "https-github.com-foo-bar");
/// assert_eq!(key("git@github.com:foo/bar"), "git-github.com-foo-bar");
/// ```
pub fn key(repo: &str) -> String {
    let (scheme, user, host, path) = if let Some(caps) = SCP_SYNTAX.captures(repo) {
        (
            String::new(),
            caps[1].to_string(),
            caps[2].to_string(),
            format!("/{}", &caps[3]),
        )
    } else {
        match Url::parse(repo) {
            Ok(url) => {
                let host = match (url.host_str(), url.port()) {
                    (Some(host), Some(port)) => format!("{}:{}", host, port),
                    (Some(host), None) => host.to_string(),
                    (None, _) => String::new(),
                };
                (
                    url.scheme().to_string(),
                    url.username().to_string(),
                    host,
                    url.path().to_string(),
                )
            }
            Err(_) => (String::new(), String::new(), String::new(), repo.to_string()),
        }
    };

    let mut key = String::new();
    if !scheme.is_empty() {
        key.push_str(&scheme);
        key.push('-');
    }
    if !user.is_empty() {
        key.push_str(&user);
        key.push('-');
    }
    key.push_str(&host);
    key.push_str(&path.replace('/', "-"));
    key.replace(':', "-")
}
