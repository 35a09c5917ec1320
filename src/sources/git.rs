//! Git repositories via libgit2.

use std::path::Path;

use anyhow::{Context, Result};
use git2::{Oid, Repository};
use tracing::{debug, info};

use crate::sources::{Fetched, RepoClient};

const FETCH_REFSPECS: [&str; 2] = [
    "+refs/heads/*:refs/remotes/origin/*",
    "+refs/tags/*:refs/tags/*",
];

/// A [`RepoClient`] backed by `git2`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitClient;

impl GitClient {
    pub fn new() -> Self {
        GitClient
    }

    fn open(dest: &Path) -> Result<Repository> {
        Repository::open(dest)
            .with_context(|| format!("failed to open git repository: {}", dest.display()))
    }

    /// Resolve a branch, tag or commit-ish to a commit id.
    fn resolve(repo: &Repository, reference: &str) -> Result<Oid> {
        let candidates = [
            reference.to_string(),
            format!("refs/tags/{}", reference),
            format!("origin/{}", reference),
        ];
        for spec in &candidates {
            if let Ok(object) = repo.revparse_single(spec) {
                let commit = object
                    .peel_to_commit()
                    .with_context(|| format!("`{}` does not name a commit", reference))?;
                return Ok(commit.id());
            }
        }
        anyhow::bail!("reference `{}` not found", reference)
    }
}

impl RepoClient for GitClient {
    fn fetch(&self, remote: &str, dest: &Path) -> Result<Fetched> {
        if dest.exists() {
            info!("Updating {}", remote);
            let repo = Self::open(dest)?;
            let mut origin = repo
                .find_remote("origin")
                .with_context(|| format!("no origin remote in {}", dest.display()))?;
            origin
                .fetch(&FETCH_REFSPECS, None, None)
                .with_context(|| format!("failed to fetch {}", remote))?;
            return Ok(Fetched::Updated);
        }

        info!("Cloning {}", remote);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
        Repository::clone(remote, dest).with_context(|| format!("failed to clone {}", remote))?;
        Ok(Fetched::Cloned)
    }

    fn tags(&self, dest: &Path) -> Result<Vec<String>> {
        let repo = Self::open(dest)?;
        let names = repo.tag_names(None)?;
        Ok(names.iter().flatten().map(str::to_string).collect())
    }

    fn tags_at(&self, dest: &Path, reference: &str) -> Result<Vec<String>> {
        let repo = Self::open(dest)?;
        let target = Self::resolve(&repo, reference)?;

        let mut found = Vec::new();
        for name in repo.tag_names(None)?.iter().flatten() {
            let commit = repo
                .revparse_single(&format!("refs/tags/{}", name))
                .and_then(|object| object.peel_to_commit());
            match commit {
                Ok(commit) if commit.id() == target => found.push(name.to_string()),
                Ok(_) => {}
                Err(e) => debug!("skipping tag {}: {}", name, e),
            }
        }
        Ok(found)
    }

    fn current_branch(&self, dest: &Path) -> Result<String> {
        let repo = Self::open(dest)?;
        let head = repo.head().context("repository has no HEAD")?;
        Ok(head.shorthand().unwrap_or_default().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use tempfile::TempDir;

    fn commit(repo: &Repository, file: &str, message: &str) -> Oid {
        let workdir = repo.workdir().unwrap();
        std::fs::write(workdir.join(file), message).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(file)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("Berth Test", "test@example.com").unwrap();
        let parents = match repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => Vec::new(),
        };
        let parents: Vec<_> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    #[test]
    fn test_clone_tags_and_update() {
        let tmp = TempDir::new().unwrap();
        let upstream_dir = tmp.path().join("upstream");
        let upstream = Repository::init(&upstream_dir).unwrap();

        let first = commit(&upstream, "a.txt", "first");
        let object = upstream.find_object(first, None).unwrap();
        upstream.tag_lightweight("v1.0.0", &object, false).unwrap();
        upstream.tag_lightweight("stable", &object, false).unwrap();
        let second = commit(&upstream, "a.txt", "second");
        let object = upstream.find_object(second, None).unwrap();
        upstream.tag_lightweight("v1.1.0", &object, false).unwrap();

        let client = GitClient::new();
        let remote = upstream_dir.to_str().unwrap();
        let dest = tmp.path().join("cache/src/upstream");

        assert_eq!(client.fetch(remote, &dest).unwrap(), Fetched::Cloned);
        assert_eq!(client.fetch(remote, &dest).unwrap(), Fetched::Updated);

        let mut tags = client.tags(&dest).unwrap();
        tags.sort();
        assert_eq!(tags, vec!["stable", "v1.0.0", "v1.1.0"]);

        let mut at_first = client.tags_at(&dest, &first.to_string()).unwrap();
        at_first.sort();
        assert_eq!(at_first, vec!["stable", "v1.0.0"]);
        assert_eq!(client.tags_at(&dest, "v1.1.0").unwrap(), vec!["v1.1.0"]);

        let branch = upstream.head().unwrap().shorthand().unwrap().to_string();
        assert_eq!(client.current_branch(&dest).unwrap(), branch);
    }

    #[test]
    fn test_unknown_reference() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::init(tmp.path()).unwrap();
        commit(&repo, "a.txt", "only");

        let err = GitClient::new().tags_at(tmp.path(), "nope").unwrap_err();
        assert!(err.to_string().contains("nope"));
    }
}
