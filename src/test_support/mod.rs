//! Helpers for unit tests.
//!
//! [`GoTree`] lays out a throwaway workspace and standard library on disk,
//! and [`MockRepoClient`] stands in for git when exercising the repo cache.
//!
//! ```rust,ignore
//! let tree = GoTree::new();
//! tree.package("src/github.com/me/app", "main", &["github.com/a/b"]);
//! tree.package("src/github.com/a/b", "b", &[]);
//! let locator = tree.locator();
//! ```

pub mod fixtures;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use tempfile::TempDir;

use crate::resolver::{LocatorConfig, PackageLocator};
use crate::sources::{Fetched, RepoClient};

/// Write `content` to `dir/rel`, creating parent directories.
pub fn write_file(dir: &Path, rel: &str, content: &str) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create parent directory");
    }
    std::fs::write(&path, content).expect("failed to write file");
    path
}

/// Go source for a package clause followed by an import block.
pub fn go_source(package: &str, imports: &[&str]) -> String {
    let mut src = format!("package {}\n", package);
    if !imports.is_empty() {
        src.push_str("\nimport (\n");
        for import in imports {
            src.push_str(&format!("\t\"{}\"\n", import));
        }
        src.push_str(")\n");
    }
    src.push_str("\nfunc init() {}\n");
    src
}

/// A temporary workspace root and standard-library root.
pub struct GoTree {
    _tmp: TempDir,
    root: PathBuf,
    stdlib_root: PathBuf,
}

impl GoTree {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let root = tmp.path().join("workspace");
        let stdlib_root = tmp.path().join("goroot");
        std::fs::create_dir_all(root.join("src")).expect("failed to create workspace");
        std::fs::create_dir_all(stdlib_root.join("src")).expect("failed to create goroot");
        GoTree {
            _tmp: tmp,
            root,
            stdlib_root,
        }
    }

    /// The workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The standard-library root.
    pub fn stdlib_root(&self) -> &Path {
        &self.stdlib_root
    }

    /// A path under the workspace root, without creating it.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Create a directory under the workspace root.
    pub fn dir(&self, rel: &str) -> PathBuf {
        let path = self.path(rel);
        std::fs::create_dir_all(&path).expect("failed to create directory");
        path
    }

    /// Write a file under the workspace root.
    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        write_file(&self.root, rel, content)
    }

    /// Create a package directory holding one source file.
    pub fn package(&self, rel: &str, package: &str, imports: &[&str]) -> PathBuf {
        let dir = self.dir(rel);
        write_file(&dir, &format!("{}.go", package), &go_source(package, imports));
        dir
    }

    /// Create a standard-library package.
    pub fn stdlib_package(&self, name: &str, imports: &[&str]) -> PathBuf {
        let package = name.rsplit('/').next().unwrap_or(name);
        let dir = self.stdlib_root.join("src").join(name);
        write_file(&dir, &format!("{}.go", package), &go_source(package, imports));
        dir
    }

    /// Locator configuration for this tree.
    pub fn locator_config(&self) -> LocatorConfig {
        LocatorConfig::new()
            .with_workspace(&self.root)
            .with_stdlib(&self.stdlib_root)
    }

    /// A locator over this tree.
    pub fn locator(&self) -> PackageLocator {
        PackageLocator::new(self.locator_config())
    }
}

impl Default for GoTree {
    fn default() -> Self {
        Self::new()
    }
}

/// A scripted [`RepoClient`]. Every remote has the same tags.
#[derive(Debug, Default)]
pub struct MockRepoClient {
    tags: Vec<(String, String)>,
    refs: HashMap<String, String>,
    branch: String,
    fail: bool,
    fetched: Mutex<Vec<String>>,
}

impl MockRepoClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag pointing at `commit`.
    pub fn with_tag(mut self, tag: &str, commit: &str) -> Self {
        self.tags.push((tag.to_string(), commit.to_string()));
        self
    }

    /// Make `reference` resolve to `commit`.
    pub fn with_ref(mut self, reference: &str, commit: &str) -> Self {
        self.refs.insert(reference.to_string(), commit.to_string());
        self
    }

    pub fn with_branch(mut self, branch: &str) -> Self {
        self.branch = branch.to_string();
        self
    }

    /// Make every fetch fail.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Remotes fetched so far, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    fn commit_of(&self, reference: &str) -> Option<&str> {
        if let Some(commit) = self.refs.get(reference) {
            return Some(commit.as_str());
        }
        self.tags
            .iter()
            .find(|(tag, commit)| tag == reference || commit == reference)
            .map(|(_, commit)| commit.as_str())
    }
}

impl RepoClient for MockRepoClient {
    fn fetch(&self, remote: &str, dest: &Path) -> Result<Fetched> {
        self.fetched.lock().unwrap().push(remote.to_string());
        if self.fail {
            return Err(anyhow!("cannot reach {}", remote));
        }
        if dest.exists() {
            return Ok(Fetched::Updated);
        }
        std::fs::create_dir_all(dest)?;
        Ok(Fetched::Cloned)
    }

    fn tags(&self, _dest: &Path) -> Result<Vec<String>> {
        Ok(self.tags.iter().map(|(tag, _)| tag.clone()).collect())
    }

    fn tags_at(&self, _dest: &Path, reference: &str) -> Result<Vec<String>> {
        let commit = self
            .commit_of(reference)
            .ok_or_else(|| anyhow!("reference `{}` not found", reference))?;
        Ok(self
            .tags
            .iter()
            .filter(|(_, c)| c == commit)
            .map(|(tag, _)| tag.clone())
            .collect())
    }

    fn current_branch(&self, _dest: &Path) -> Result<String> {
        Ok(self.branch.clone())
    }
}
