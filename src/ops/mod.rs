//! High-level operations.
//!
//! This module contains the implementation of berth commands.

pub mod import;
pub mod tree;
pub mod versions;

use std::path::{Path, PathBuf};

use crate::core::import_path::to_slash;
use crate::core::Manifest;
use crate::util::fs::normalize_path;

pub use import::{import_dir, merge_into};
pub use tree::{render, root_package, tree};
pub use versions::{gather_all, VersionReport};

/// The import path of the project in `dir`.
///
/// Taken from `berth.yaml` when it names the package, otherwise from the
/// directory's position under a workspace `src/`, otherwise the directory name.
pub fn project_name(dir: &Path, workspace: &[PathBuf]) -> String {
    if let Ok(manifest) = Manifest::load(&Manifest::path_in(dir)) {
        if !manifest.name.is_empty() {
            return manifest.name;
        }
    }

    let dir = normalize_path(dir);
    for root in workspace {
        let src = normalize_path(&root.join("src"));
        if let Ok(rel) = dir.strip_prefix(&src) {
            if !rel.as_os_str().is_empty() {
                return to_slash(&rel.to_string_lossy());
            }
        }
    }
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| ".".to_string())
}
