//! `Godeps/Godeps.json`.

use std::path::Path;

use serde::Deserialize;

use super::{announce, is_file, merge, read_file, ImportError, Importer};
use crate::core::Dependency;

const GODEPS_JSON: &str = "Godeps/Godeps.json";

/// Subpackages under this prefix are godep's own copies, not imports.
const WORKSPACE_PREFIX: &str = "Godeps/_workspace/src";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Godeps {
    #[serde(default)]
    deps: Vec<GodepEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GodepEntry {
    import_path: String,
    #[serde(default)]
    rev: String,
}

/// Importer for godep.
#[derive(Debug, Default, Clone, Copy)]
pub struct Godep;

impl Importer for Godep {
    fn name(&self) -> &'static str {
        "godep"
    }

    fn has(&self, dir: &Path) -> bool {
        dir.join(GODEPS_JSON).exists()
    }

    fn parse(&self, dir: &Path) -> Result<Vec<Dependency>, ImportError> {
        let path = dir.join(GODEPS_JSON);
        if !is_file(&path) {
            return Ok(Vec::new());
        }
        announce("Godeps.json file", dir, "Godeps");

        let content = read_file(&path)?;
        let godeps: Godeps = serde_json::from_str(&content)
            .map_err(|e| ImportError::parse(&path, Some(e.line()), e.to_string()))?;

        let deps = godeps.deps.into_iter().map(|entry| {
            let mut dep = Dependency::from_import_path(&entry.import_path);
            dep.reference = entry.rev;
            dep.subpackages
                .retain(|sub| !sub.starts_with(WORKSPACE_PREFIX));
            dep
        });
        Ok(merge(deps))
    }
}
