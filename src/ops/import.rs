//! Implementation of `berth import`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::core::Manifest;
use crate::importers::{ImportError, ImportRouter, Imported};
use crate::ops::project_name;

/// Read dependency metadata from the first known format in `dir`.
pub fn import_dir(dir: &Path) -> Result<Option<Imported>, ImportError> {
    ImportRouter::new().import(dir)
}

/// Merge imported dependencies into the project's `berth.yaml` and save it.
///
/// A missing manifest is created, named after the project.
pub fn merge_into(dir: &Path, imported: Imported, workspace: &[PathBuf]) -> Result<Manifest> {
    let path = Manifest::path_in(dir);
    let mut manifest = if path.is_file() {
        Manifest::load(&path)?
    } else {
        Manifest::new(project_name(dir, workspace))
    };

    let before = manifest.imports.len();
    manifest
        .add_imports(imported.deps)
        .map_err(ImportError::from)?;
    info!(
        "Imported {} dependencies from {} metadata",
        manifest.imports.len().saturating_sub(before),
        imported.format
    );

    manifest
        .save(&path)
        .with_context(|| format!("failed to write file: {}", path.display()))?;
    Ok(manifest)
}
