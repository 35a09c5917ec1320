//! Version facts observed during one run.
//!
//! A [`VersionCache`] is created once per invocation and shared by reference
//! with every worker that inspects repositories. All four maps sit behind one
//! reader/writer lock so each call sees and leaves a consistent state.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::resolver::version::{is_semver, parse_version_lenient};

#[derive(Debug, Default)]
struct Entries {
    touched: HashSet<String>,
    versions: HashMap<String, Vec<String>>,
    latest: HashMap<String, String>,
    current: HashMap<String, String>,
}

/// Concurrent store of per-package version facts.
#[derive(Debug, Default)]
pub struct VersionCache {
    entries: RwLock<Entries>,
}

impl VersionCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark a name as examined.
    pub fn touch(&self, name: &str) {
        self.write().touched.insert(name.to_string());
    }

    /// Whether a name was examined this run.
    pub fn touched(&self, name: &str) -> bool {
        self.read().touched.contains(name)
    }

    /// Record a version seen for a name.
    ///
    /// The name is marked touched either way. Strings that are not semantic
    /// versions (branches, commit ids) are otherwise ignored.
    pub fn put(&self, name: &str, version: &str) {
        let mut entries = self.write();
        entries.touched.insert(name.to_string());

        let Some(parsed) = parse_version_lenient(version) else {
            debug!("Ignoring {} version {}: not a semantic version", name, version);
            return;
        };

        let replace = match entries.latest.get(name) {
            None => true,
            Some(latest) => {
                parse_version_lenient(latest).is_some_and(|latest| parsed > latest)
            }
        };
        if replace {
            entries.latest.insert(name.to_string(), version.to_string());
        }

        let seen = entries.versions.entry(name.to_string()).or_default();
        if !seen.iter().any(|v| v == version) {
            seen.push(version.to_string());
        }
    }

    /// Highest version recorded for a name, or an empty string.
    pub fn latest(&self, name: &str) -> String {
        self.read().latest.get(name).cloned().unwrap_or_default()
    }

    /// All distinct versions recorded for a name.
    pub fn versions(&self, name: &str) -> Vec<String> {
        self.read().versions.get(name).cloned().unwrap_or_default()
    }

    /// Fix the version selected for a name.
    ///
    /// The first value wins, except that a value which is not a semantic
    /// version yields to one that is.
    pub fn set_current(&self, name: &str, version: &str) {
        let mut entries = self.write();
        let keep = entries.current.get(name).is_some_and(|existing| {
            !existing.is_empty() && (is_semver(existing) || !is_semver(version))
        });
        if !keep {
            entries.current.insert(name.to_string(), version.to_string());
        }
    }

    /// The version selected for a name, or an empty string.
    pub fn current(&self, name: &str) -> String {
        self.read().current.get(name).cloned().unwrap_or_default()
    }
}
