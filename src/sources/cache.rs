//! Repository checkouts in the shared cache.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::cache::{self, CacheHome, CacheLock, RepoInfo, VersionCache};
use crate::core::Dependency;
use crate::resolver::version::is_semver;
use crate::sources::{Fetched, RepoClient};

/// Fetches dependencies into `<home>/cache/src` and records their tags.
pub struct RepoCache<'a> {
    home: &'a CacheHome,
    client: &'a dyn RepoClient,
    lock: CacheLock,
}

impl<'a> RepoCache<'a> {
    /// Create a repo cache. `lock` should be the process-wide lock for `home`.
    pub fn new(home: &'a CacheHome, client: &'a dyn RepoClient, lock: CacheLock) -> Self {
        RepoCache { home, client, lock }
    }

    pub fn home(&self) -> &CacheHome {
        self.home
    }

    pub fn lock(&self) -> &CacheLock {
        &self.lock
    }

    /// Cache key and checkout directory for a dependency.
    pub fn location(&self, dep: &Dependency) -> (String, PathBuf) {
        let key = cache::key(&dep.remote());
        let dir = self.home.repo_dir(&key);
        (key, dir)
    }

    /// Fetch a dependency and record what its repository says about versions.
    pub fn gather(&self, dep: &Dependency, versions: &VersionCache) -> Result<()> {
        if !self.home.is_enabled() {
            anyhow::bail!("the cache is disabled; cannot inspect {}", dep.name);
        }
        let remote = dep.remote();
        let (key, dir) = self.location(dep);

        self.lock.acquire()?;
        self.home.setup()?;

        let fetched = self
            .client
            .fetch(&remote, &dir)
            .with_context(|| format!("failed to fetch {}", dep.name))?;
        versions.touch(&dep.name);

        for tag in self.client.tags(&dir)? {
            versions.put(&dep.name, &tag);
        }

        if fetched == Fetched::Cloned {
            let default_branch = self.client.current_branch(&dir).unwrap_or_else(|e| {
                warn!("could not read the default branch of {}: {}", dep.name, e);
                String::new()
            });
            self.home.save_repo_info(
                &key,
                &RepoInfo {
                    default_branch,
                    ..Default::default()
                },
            )?;
        }

        if dep.reference.is_empty() {
            return Ok(());
        }
        match self.client.tags_at(&dir, &dep.reference) {
            Ok(tags) => {
                for tag in tags {
                    versions.set_current(&dep.name, &tag);
                }
            }
            Err(e) => debug!("no tags at {} {}: {}", dep.name, dep.reference, e),
        }
        if is_semver(&dep.reference) {
            versions.set_current(&dep.name, &dep.reference);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockRepoClient;
    use tempfile::TempDir;

    fn client() -> MockRepoClient {
        MockRepoClient::new()
            .with_tag("v1.0.0", "aaa")
            .with_tag("v1.1.0", "bbb")
            .with_tag("release-bbb", "bbb")
            .with_ref("main", "bbb")
            .with_branch("main")
    }

    #[test]
    fn test_gather_records_tags() {
        let tmp = TempDir::new().unwrap();
        let home = CacheHome::new(tmp.path());
        let client = client();
        let repos = RepoCache::new(&home, &client, home.lock());
        let versions = VersionCache::new();

        let dep = Dependency::new("github.com/a/b").with_reference("main");
        repos.gather(&dep, &versions).unwrap();

        assert!(versions.touched("github.com/a/b"));
        assert_eq!(versions.latest("github.com/a/b"), "v1.1.0");
        assert_eq!(versions.current("github.com/a/b"), "v1.1.0");
        assert_eq!(client.fetched(), vec!["https://github.com/a/b"]);

        let (key, dir) = repos.location(&dep);
        assert_eq!(key, "https-github.com-a-b");
        assert!(dir.is_dir());
        assert_eq!(home.repo_info(&key).unwrap().default_branch, "main");
        assert!(repos.lock().is_held());
    }

    #[test]
    fn test_semver_reference_is_current() {
        let tmp = TempDir::new().unwrap();
        let home = CacheHome::new(tmp.path());
        let client = MockRepoClient::new();
        let repos = RepoCache::new(&home, &client, home.lock());
        let versions = VersionCache::new();

        let dep = Dependency::new("github.com/a/b").with_reference("v2.0.0");
        repos.gather(&dep, &versions).unwrap();
        assert_eq!(versions.current("github.com/a/b"), "v2.0.0");
        assert_eq!(versions.latest("github.com/a/b"), "");
    }

    #[test]
    fn test_repository_overrides_remote() {
        let tmp = TempDir::new().unwrap();
        let home = CacheHome::new(tmp.path());
        let client = client();
        let repos = RepoCache::new(&home, &client, home.lock());

        let dep = Dependency::new("github.com/a/b").with_repository("git@github.com:fork/b");
        repos.gather(&dep, &VersionCache::new()).unwrap();
        assert_eq!(client.fetched(), vec!["git@github.com:fork/b"]);
        assert_eq!(repos.location(&dep).0, "git-github.com-fork-b");
    }

    #[test]
    fn test_disabled_cache() {
        let tmp = TempDir::new().unwrap();
        let home = CacheHome::new(tmp.path()).with_enabled(false);
        let client = client();
        let repos = RepoCache::new(&home, &client, home.lock());

        let err = repos
            .gather(&Dependency::new("github.com/a/b"), &VersionCache::new())
            .unwrap_err();
        assert!(err.to_string().contains("disabled"));
        assert!(client.fetched().is_empty());
    }
}
