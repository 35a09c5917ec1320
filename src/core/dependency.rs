//! Dependency declarations.
//!
//! A Dependency is a normalized import declaration: the root package, the
//! reference it is pinned to, where to fetch it from, and the subpackages
//! actually imported from it.

use std::collections::BTreeSet;
use std::fmt;

use miette::Diagnostic as MietteDiagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::import_path::normalize_name;

/// Two declarations of the same root that cannot be merged.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
#[error("import `{name}` repeated with different {field}: `{first}` and `{second}`")]
#[diagnostic(
    code(berth::import::conflict),
    help("Edit the manifest so every declaration of `{name}` agrees on its {field}")
)]
pub struct ConflictError {
    pub name: String,
    pub field: &'static str,
    pub first: String,
    pub second: String,
}

/// A dependency on a root package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Root package name
    #[serde(rename = "package")]
    pub name: String,

    /// Tag, branch, or commit-ish
    #[serde(rename = "version", default, skip_serializing_if = "String::is_empty")]
    pub reference: String,

    /// Explicit source location
    #[serde(rename = "repo", default, skip_serializing_if = "String::is_empty")]
    pub repository: String,

    /// Explicit VCS kind (git, hg, bzr, svn)
    #[serde(
        rename = "vcs",
        default,
        skip_serializing_if = "String::is_empty",
        deserialize_with = "deserialize_vcs"
    )]
    pub vcs_type: String,

    /// Paths under `name` that are imported
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub subpackages: BTreeSet<String>,

    /// Operating systems this dependency is limited to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub os: Vec<String>,

    /// Architectures this dependency is limited to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arch: Vec<String>,
}

impl Dependency {
    /// Create a dependency on a root package.
    pub fn new(name: impl Into<String>) -> Self {
        Dependency {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create a dependency from an import path that may name a subpackage.
    pub fn from_import_path(path: &str) -> Self {
        let (root, sub) = normalize_name(path);
        let mut dep = Dependency::new(root);
        if !sub.is_empty() {
            dep.subpackages.insert(sub);
        }
        dep
    }

    /// Set the reference.
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    /// Set the repository.
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = repository.into();
        self
    }

    /// Set the VCS kind.
    pub fn with_vcs_type(mut self, vcs: &str) -> Self {
        self.vcs_type = filter_vcs_type(vcs).to_string();
        self
    }

    /// Set the OS filter.
    pub fn with_os(mut self, os: Vec<String>) -> Self {
        self.os = os;
        self
    }

    /// Set the architecture filter.
    pub fn with_arch(mut self, arch: Vec<String>) -> Self {
        self.arch = arch;
        self
    }

    /// Check whether a subpackage is imported.
    pub fn has_subpackage(&self, sub: &str) -> bool {
        self.subpackages.contains(sub)
    }

    /// The location to fetch this dependency from.
    pub fn remote(&self) -> String {
        if self.repository.is_empty() {
            format!("https://{}", self.name)
        } else {
            self.repository.clone()
        }
    }

    /// Merge another declaration of the same root into this one.
    ///
    /// Empty scalar fields on either side never conflict; the first
    /// non-empty value wins and subpackages are unioned.
    pub fn merge(&mut self, other: Dependency) -> Result<(), ConflictError> {
        merge_scalar(&self.name, "version", &mut self.reference, other.reference)?;
        merge_scalar(&self.name, "repository", &mut self.repository, other.repository)?;
        merge_scalar(&self.name, "vcs", &mut self.vcs_type, other.vcs_type)?;
        merge_list(&self.name, "os", &mut self.os, other.os)?;
        merge_list(&self.name, "arch", &mut self.arch, other.arch)?;
        self.subpackages.extend(other.subpackages);
        Ok(())
    }
}

fn merge_scalar(
    name: &str,
    field: &'static str,
    current: &mut String,
    incoming: String,
) -> Result<(), ConflictError> {
    if incoming.is_empty() || *current == incoming {
        return Ok(());
    }
    if current.is_empty() {
        *current = incoming;
        return Ok(());
    }
    Err(ConflictError {
        name: name.to_string(),
        field,
        first: current.clone(),
        second: incoming,
    })
}

fn merge_list(
    name: &str,
    field: &'static str,
    current: &mut Vec<String>,
    incoming: Vec<String>,
) -> Result<(), ConflictError> {
    if incoming.is_empty() || *current == incoming {
        return Ok(());
    }
    if current.is_empty() {
        *current = incoming;
        return Ok(());
    }
    Err(ConflictError {
        name: name.to_string(),
        field,
        first: current.join(","),
        second: incoming.join(","),
    })
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.reference.is_empty() {
            write!(f, " {}", self.reference)?;
        }
        Ok(())
    }
}

/// An ordered list of dependencies with unique root names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dependencies(Vec<Dependency>);

impl Dependencies {
    /// Create an empty list.
    pub fn new() -> Self {
        Dependencies(Vec::new())
    }

    /// Add a declaration, merging it into an existing entry with the same root.
    pub fn add(&mut self, dep: Dependency) -> Result<(), ConflictError> {
        match self.0.iter_mut().find(|d| d.name == dep.name) {
            Some(existing) => existing.merge(dep),
            None => {
                self.0.push(dep);
                Ok(())
            }
        }
    }

    /// Rebuild a list so that each root appears once.
    pub fn dedupe(deps: impl IntoIterator<Item = Dependency>) -> Result<Self, ConflictError> {
        let mut out = Dependencies::new();
        for dep in deps {
            out.add(dep)?;
        }
        Ok(out)
    }

    /// Get a dependency by name.
    pub fn get(&self, name: &str) -> Option<&Dependency> {
        self.0.iter().find(|d| d.name == name)
    }

    /// Check if a dependency is on the list.
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove a dependency by name, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<Dependency> {
        let index = self.0.iter().position(|d| d.name == name)?;
        Some(self.0.remove(index))
    }

    /// Number of dependencies.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the dependencies.
    pub fn iter(&self) -> std::slice::Iter<'_, Dependency> {
        self.0.iter()
    }

    /// Consume the list.
    pub fn into_vec(self) -> Vec<Dependency> {
        self.0
    }
}

impl IntoIterator for Dependencies {
    type Item = Dependency;
    type IntoIter = std::vec::IntoIter<Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dependencies {
    type Item = &'a Dependency;
    type IntoIter = std::slice::Iter<'a, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Map VCS aliases to their canonical short names.
pub fn filter_vcs_type(vcs: &str) -> &'static str {
    match vcs {
        "git" => "git",
        "hg" | "mercurial" => "hg",
        "bzr" | "bazaar" => "bzr",
        "svn" | "subversion" => "svn",
        _ => "",
    }
}

fn deserialize_vcs<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(filter_vcs_type(&raw).to_string())
}
