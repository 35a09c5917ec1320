//! Implementation of `berth tree`.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{bail, Result};

use crate::core::{Location, PackageInfo};
use crate::ops::project_name;
use crate::resolver::{PackageLocator, TreeBuilder, TreeEntry};
use crate::util::fs::normalize_path;

/// The package rooted at `dir`.
pub fn root_package(dir: &Path, locator: &PackageLocator) -> Result<PackageInfo> {
    if !dir.is_dir() {
        bail!("not a directory: {}", dir.display());
    }
    let dir = normalize_path(dir);
    let name = project_name(&dir, &locator.config().workspace);
    Ok(PackageInfo::new(name, dir, Location::GlobalWorkspace))
}

/// Format a walk as an indented tree under `root`.
///
/// Unresolved names are listed with the command that would fetch them.
pub fn render(root: &str, entries: impl IntoIterator<Item = TreeEntry>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", root);
    for entry in entries {
        if entry.info.loc == Location::Unknown {
            let _ = writeln!(out, "\t{}\t(berth get {})", entry.name, entry.name);
            continue;
        }
        out.push_str(&"|\t".repeat(entry.depth.saturating_sub(1)));
        out.push_str("|-- ");
        if entry.recursive {
            out.push_str("(Recursion) ");
        }
        // Names with no directory (cgo, App Engine) show their kind instead
        if entry.info.path.as_os_str().is_empty() {
            let _ = writeln!(out, "{}   ({})", entry.info.name, entry.info.loc);
        } else {
            let _ = writeln!(out, "{}   ({})", entry.info.name, entry.info.path.display());
        }
    }
    out
}

/// Walk and render the imports of the package in `dir`.
pub fn tree(dir: &Path, locator: &PackageLocator, include_stdlib: bool) -> Result<String> {
    let root = root_package(dir, locator)?;
    let walk = TreeBuilder::new(locator)
        .include_stdlib(include_stdlib)
        .walk(&root);
    Ok(render(&root.name, walk))
}
