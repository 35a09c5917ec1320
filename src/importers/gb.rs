//! gb's `vendor/manifest`.

use std::path::Path;

use serde::Deserialize;

use super::{announce, is_file, merge, read_file, ImportError, Importer};
use crate::core::Dependency;

const MANIFEST: &str = "vendor/manifest";

#[derive(Debug, Deserialize)]
struct GbManifest {
    #[serde(default)]
    dependencies: Vec<GbDependency>,
}

#[derive(Debug, Deserialize)]
struct GbDependency {
    importpath: String,
    #[serde(default)]
    repository: String,
    #[serde(default)]
    revision: String,
}

/// Importer for gb.
#[derive(Debug, Default, Clone, Copy)]
pub struct Gb;

impl Importer for Gb {
    fn name(&self) -> &'static str {
        "gb"
    }

    fn has(&self, dir: &Path) -> bool {
        is_file(&dir.join(MANIFEST))
    }

    fn parse(&self, dir: &Path) -> Result<Vec<Dependency>, ImportError> {
        let path = dir.join(MANIFEST);
        if !is_file(&path) {
            return Ok(Vec::new());
        }
        announce("GB manifest file", dir, "GB");

        let content = read_file(&path)?;
        let manifest: GbManifest = serde_json::from_str(&content)
            .map_err(|e| ImportError::parse(&path, Some(e.line()), e.to_string()))?;

        let deps = manifest.dependencies.into_iter().map(|d| {
            Dependency::from_import_path(&d.importpath)
                .with_reference(d.revision)
                .with_repository(d.repository)
        });
        Ok(merge(deps))
    }
}
