//! The canonical `berth.yaml` manifest.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::dependency::{ConflictError, Dependencies, Dependency};

/// File name of the canonical manifest.
pub const MANIFEST_NAME: &str = "berth.yaml";

/// Errors loading or saving a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest: {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to write manifest: {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize manifest")]
    Serialize(#[source] serde_yaml::Error),

    #[error(transparent)]
    Conflict(#[from] ConflictError),
}

/// A project's dependency manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Import path of the project itself
    #[serde(rename = "package", default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    /// Names never to fetch or record
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,

    #[serde(rename = "import", default)]
    pub imports: Dependencies,

    #[serde(rename = "testImport", default, skip_serializing_if = "Dependencies::is_empty")]
    pub dev_imports: Dependencies,
}

impl Manifest {
    /// Create an empty manifest for a project.
    pub fn new(name: impl Into<String>) -> Self {
        Manifest {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Path of the manifest inside a project directory.
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(MANIFEST_NAME)
    }

    /// Check whether a project directory has a manifest.
    pub fn exists_in(dir: &Path) -> bool {
        Self::path_in(dir).is_file()
    }

    /// Load a manifest from a file path.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse manifest content.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ManifestError> {
        if content.trim().is_empty() {
            return Ok(Manifest::default());
        }
        serde_yaml::from_str(content).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, ManifestError> {
        serde_yaml::to_string(self).map_err(ManifestError::Serialize)
    }

    /// Write the manifest to a file.
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        let yaml = self.to_yaml()?;
        std::fs::write(path, yaml).map_err(|source| ManifestError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check whether a name is on the ignore list.
    pub fn has_ignore(&self, name: &str) -> bool {
        self.ignore.iter().any(|i| i == name)
    }

    /// Merge duplicate entries, then drop the project itself and ignored names.
    pub fn dedupe(&mut self) -> Result<(), ConflictError> {
        let imports = std::mem::take(&mut self.imports);
        self.imports = self.clean(imports)?;
        let dev_imports = std::mem::take(&mut self.dev_imports);
        self.dev_imports = self.clean(dev_imports)?;
        Ok(())
    }

    fn clean(&self, deps: Dependencies) -> Result<Dependencies, ConflictError> {
        let mut deps = Dependencies::dedupe(deps)?;
        if !self.name.is_empty() {
            deps.remove(&self.name);
        }
        for name in &self.ignore {
            deps.remove(name);
        }
        Ok(deps)
    }

    /// Append imports and re-deduplicate.
    pub fn add_imports(
        &mut self,
        deps: impl IntoIterator<Item = Dependency>,
    ) -> Result<(), ConflictError> {
        for dep in deps {
            self.imports.add(dep)?;
        }
        self.dedupe()
    }
}
