//! Implementation of `berth versions`.

use anyhow::Result;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::cache::VersionCache;
use crate::core::Dependency;
use crate::sources::RepoCache;

/// Release information for one dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionReport {
    pub name: String,
    /// Highest semantic version tagged in the repository
    pub latest: String,
    /// Version the dependency is pinned to, if it maps to one
    pub current: String,
    /// Why the repository could not be inspected
    pub error: Option<String>,
}

impl VersionReport {
    /// Whether a newer release than the pinned one exists.
    pub fn is_outdated(&self) -> bool {
        !self.current.is_empty() && !self.latest.is_empty() && self.current != self.latest
    }
}

/// Gather release information for every dependency in parallel.
///
/// The cache lock is taken once up front and shared by all workers. A
/// repository that cannot be fetched is reported, not fatal.
pub fn gather_all(
    deps: &[Dependency],
    cache: &RepoCache<'_>,
    versions: &VersionCache,
) -> Result<Vec<VersionReport>> {
    if deps.is_empty() {
        return Ok(Vec::new());
    }
    cache.lock().acquire()?;
    cache.home().setup()?;
    info!("Checking {} repositories for releases", deps.len());

    let reports = deps
        .par_iter()
        .map(|dep| {
            let error = match cache.gather(dep, versions) {
                Ok(()) => None,
                Err(e) => {
                    warn!("Unable to inspect {}: {:#}", dep.name, e);
                    Some(format!("{:#}", e))
                }
            };
            VersionReport {
                name: dep.name.clone(),
                latest: versions.latest(&dep.name),
                current: versions.current(&dep.name),
                error,
            }
        })
        .collect();
    Ok(reports)
}
