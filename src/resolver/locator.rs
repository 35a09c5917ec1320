//! Package location.
//!
//! Resolves an import name to the directory that provides it, searching in
//! order: vendor trees from the importing directory upward, the global
//! workspace roots, and the standard distribution roots.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::{Location, PackageInfo};
use crate::util::fs::{is_dir_or_symlink, is_inside, normalize_path};

/// Namespaces of the legacy App Engine SDK.
const PLATFORM_SDK_NAMES: &[&str] = &["appengine", "appengine_internal"];

/// Packages that moved into the standard library after vendoring rules were
/// settled. They classify as standard even when a copy exists elsewhere.
const MIGRATED_STDLIB_NAMES: &[&str] = &["context", "net/http/httptrace"];

/// Roots searched by the locator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocatorConfig {
    /// Global workspace roots; packages live at `<root>/src/<name>`
    pub workspace: Vec<PathBuf>,
    /// Standard distribution roots; packages live at `<root>/src/<name>`
    pub stdlib: Vec<PathBuf>,
}

impl LocatorConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a global workspace root.
    pub fn with_workspace(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace.push(root.into());
        self
    }

    /// Add a standard distribution root.
    pub fn with_stdlib(mut self, root: impl Into<PathBuf>) -> Self {
        self.stdlib.push(root.into());
        self
    }
}

/// Resolves import names to locations.
#[derive(Debug, Clone)]
pub struct PackageLocator {
    config: LocatorConfig,
    /// Workspace roots in normalized form, for the upward-walk boundary
    boundaries: Vec<PathBuf>,
    /// `<stdlib>/src` directories in normalized form
    stdlib_src: Vec<PathBuf>,
}

impl PackageLocator {
    /// Create a locator over the given roots.
    pub fn new(config: LocatorConfig) -> Self {
        let boundaries = config.workspace.iter().map(|p| normalize_path(p)).collect();
        let stdlib_src = config
            .stdlib
            .iter()
            .map(|p| normalize_path(&p.join("src")))
            .collect();
        PackageLocator {
            config,
            boundaries,
            stdlib_src,
        }
    }

    /// Get the configured roots.
    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Resolve an import name as seen from `current_dir`.
    ///
    /// Never fails: a name that is found nowhere resolves to
    /// [`Location::Unknown`] with an empty path.
    pub fn resolve(&self, name: &str, current_dir: &Path) -> PackageInfo {
        if name.starts_with("./") || name.starts_with("../") {
            return PackageInfo::new(name, current_dir.join(name), Location::Relative);
        }

        if let Some(info) = self.resolve_special(name) {
            return info;
        }

        if let Some(path) = self.find_vendored(name, current_dir) {
            debug!("found {} in {}", name, path.display());
            return PackageInfo::new(name, path, Location::Vendor);
        }

        if let Some(path) = probe_roots(&self.config.workspace, name) {
            return PackageInfo::new(name, path, Location::GlobalWorkspace);
        }

        if let Some(path) = probe_roots(&self.config.stdlib, name) {
            return PackageInfo::new(name, path, Location::StandardLibrary);
        }

        debug!("{} not found from {}", name, current_dir.display());
        PackageInfo::unknown(name)
    }

    /// Identities that are classified without looking at the filesystem.
    fn resolve_special(&self, name: &str) -> Option<PackageInfo> {
        if name == "C" {
            return Some(PackageInfo::new(name, PathBuf::new(), Location::Cgo));
        }

        let is_sdk = PLATFORM_SDK_NAMES.iter().any(|sdk| {
            name == *sdk
                || name
                    .strip_prefix(sdk)
                    .is_some_and(|rest| rest.starts_with('/'))
        });
        if is_sdk {
            return Some(PackageInfo::new(
                name,
                PathBuf::new(),
                Location::LegacyPlatformSDK,
            ));
        }

        if MIGRATED_STDLIB_NAMES.contains(&name) {
            let path = probe_roots(&self.config.stdlib, name).unwrap_or_default();
            return Some(PackageInfo::new(name, path, Location::StandardLibrary));
        }

        None
    }

    /// Walk upward from `current_dir` looking for `vendor/<name>`, stopping at
    /// a workspace root.
    fn find_vendored(&self, name: &str, current_dir: &Path) -> Option<PathBuf> {
        let mut dir = normalize_path(current_dir);
        loop {
            if self.boundaries.iter().any(|b| *b == dir) {
                return None;
            }

            let candidate = dir.join("vendor").join(name);
            if is_dir_or_symlink(&candidate) {
                return Some(candidate);
            }

            // Stop once a step makes no progress
            match dir.parent() {
                Some(parent) if parent != dir => dir = parent.to_path_buf(),
                _ => return None,
            }
        }
    }

    /// Whether a directory belongs to the standard distribution.
    pub fn in_stdlib(&self, dir: &Path) -> bool {
        let dir = normalize_path(dir);
        self.stdlib_src.iter().any(|src| is_inside(&dir, src))
    }
}

fn probe_roots(roots: &[PathBuf], name: &str) -> Option<PathBuf> {
    roots
        .iter()
        .map(|root| root.join("src").join(name))
        .find(|candidate| is_dir_or_symlink(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::GoTree;

    #[test]
    fn test_relative_is_not_probed() {
        let locator = PackageLocator::new(LocatorConfig::new());
        let info = locator.resolve("./sub", Path::new("/nonexistent/project"));
        assert_eq!(info.loc, Location::Relative);
        assert_eq!(info.path, Path::new("/nonexistent/project").join("./sub"));

        let info = locator.resolve("../sibling", Path::new("/nonexistent/project"));
        assert_eq!(info.loc, Location::Relative);
    }

    #[test]
    fn test_vendor_beats_workspace() {
        let tree = GoTree::new();
        tree.package("src/github.com/me/app", "main", &[]);
        tree.package("src/github.com/me/app/vendor/github.com/a/b", "b", &[]);
        tree.package("src/github.com/a/b", "b", &[]);
        let app_sub = tree.dir("src/github.com/me/app/cmd/tool");

        let locator = tree.locator();
        let info = locator.resolve("github.com/a/b", &app_sub);
        assert_eq!(info.loc, Location::Vendor);
        assert!(info.vendored);
        assert_eq!(
            info.path,
            normalize_path(&tree.path("src/github.com/me/app/vendor/github.com/a/b"))
        );
    }

    #[test]
    fn test_workspace_and_stdlib() {
        let tree = GoTree::new();
        tree.package("src/github.com/me/app", "main", &[]);
        tree.package("src/github.com/a/b", "b", &[]);
        tree.stdlib_package("fmt", &[]);
        let app = tree.path("src/github.com/me/app");

        let locator = tree.locator();
        let info = locator.resolve("github.com/a/b", &app);
        assert_eq!(info.loc, Location::GlobalWorkspace);
        assert!(!info.vendored);

        let info = locator.resolve("fmt", &app);
        assert_eq!(info.loc, Location::StandardLibrary);
        assert!(locator.in_stdlib(&info.path));

        let info = locator.resolve("example.com/missing", &app);
        assert_eq!(info.loc, Location::Unknown);
        assert!(info.path.as_os_str().is_empty());
    }

    #[test]
    fn test_walk_stops_at_workspace_root() {
        let tree = GoTree::new();
        // A vendor directory at the workspace root itself is never consulted
        tree.package("vendor/github.com/a/b", "b", &[]);
        tree.package("src/github.com/me/app", "main", &[]);

        let locator = tree.locator();
        let info = locator.resolve("github.com/a/b", &tree.path("src/github.com/me/app"));
        assert_eq!(info.loc, Location::Unknown);
    }

    #[test]
    fn test_boundary_ignores_trailing_separator() {
        let tree = GoTree::new();
        tree.package("vendor/github.com/a/b", "b", &[]);
        tree.package("src/github.com/me/app", "main", &[]);

        let root = format!("{}/", tree.root().display());
        let locator = PackageLocator::new(LocatorConfig::new().with_workspace(root));
        let info = locator.resolve("github.com/a/b", &tree.path("src/github.com/me/app"));
        assert_eq!(info.loc, Location::Unknown);
    }

    #[test]
    fn test_special_names() {
        let tree = GoTree::new();
        tree.package("src/context", "context", &[]);
        tree.stdlib_package("context", &[]);
        let locator = tree.locator();
        let here = tree.root();

        assert_eq!(locator.resolve("C", here).loc, Location::Cgo);
        assert_eq!(locator.resolve("appengine", here).loc, Location::LegacyPlatformSDK);
        assert_eq!(
            locator.resolve("appengine_internal/base", here).loc,
            Location::LegacyPlatformSDK
        );
        assert_eq!(locator.resolve("appenginex", here).loc, Location::Unknown);

        let info = locator.resolve("context", here);
        assert_eq!(info.loc, Location::StandardLibrary);
        assert_eq!(info.path, tree.stdlib_root().join("src").join("context"));
    }

    #[test]
    fn test_relative_current_dir_terminates() {
        let locator = PackageLocator::new(LocatorConfig::new());
        let info = locator.resolve("example.com/nothing/here", Path::new("."));
        assert_eq!(info.loc, Location::Unknown);
        let info = locator.resolve("example.com/nothing/here", Path::new(""));
        assert_eq!(info.loc, Location::Unknown);
    }

    #[cfg(unix)]
    #[test]
    fn test_vendor_symlink() {
        let tree = GoTree::new();
        tree.package("src/github.com/me/app", "main", &[]);
        tree.package("elsewhere/b", "b", &[]);
        let vendor = tree.dir("src/github.com/me/app/vendor/github.com/a");
        crate::util::fs::symlink(&tree.path("elsewhere/b"), &vendor.join("b")).unwrap();

        let locator = tree.locator();
        let info = locator.resolve("github.com/a/b", &tree.path("src/github.com/me/app"));
        assert_eq!(info.loc, Location::Vendor);
    }
}
