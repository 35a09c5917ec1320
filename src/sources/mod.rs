//! Remote repositories.
//!
//! A [`RepoClient`] knows how to fetch a repository and inspect its tags.
//! [`RepoCache`] keeps checkouts in the shared cache and feeds what it finds
//! into a [`VersionCache`](crate::cache::VersionCache).

pub mod cache;
pub mod git;

use std::path::Path;

use anyhow::Result;

pub use cache::RepoCache;
pub use git::GitClient;

/// What a fetch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetched {
    /// The repository was not present and has been cloned
    Cloned,
    /// An existing checkout was updated
    Updated,
}

/// Access to a version-controlled repository.
pub trait RepoClient: Send + Sync {
    /// Clone `remote` into `dest`, or update `dest` when it already exists.
    fn fetch(&self, remote: &str, dest: &Path) -> Result<Fetched>;

    /// All tag names in the checkout.
    fn tags(&self, dest: &Path) -> Result<Vec<String>>;

    /// Tags pointing at the commit `reference` resolves to.
    fn tags_at(&self, dest: &Path, reference: &str) -> Result<Vec<String>>;

    /// The branch checked out in `dest`.
    fn current_branch(&self, dest: &Path) -> Result<String>;
}
