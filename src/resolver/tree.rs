//! Import tree walking.
//!
//! [`TreeWalk`] is a lazy depth-first iterator over the import graph of a
//! package. Each branch carries its own ancestor chain, so a package that
//! appears twice on sibling branches (a diamond) is walked on both, while a
//! package that appears on its own ancestor chain (a cycle) is reported once
//! as recursive and not descended into.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, warn};

use crate::core::{Location, PackageInfo};
use crate::resolver::locator::PackageLocator;
use crate::resolver::scan::{scan_dir, scan_dir_tolerant, source_dirs, ScanError};

/// One node of the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub name: String,
    pub info: PackageInfo,
    /// 1 for direct imports of the root
    pub depth: usize,
    /// The name already appears among this entry's ancestors
    pub recursive: bool,
}

/// Persistent list of ancestor names. Pushing shares the tail, so every
/// branch gets its own view without copying.
#[derive(Debug, Clone, Default)]
struct Ancestry(Option<Rc<AncestryNode>>);

#[derive(Debug)]
struct AncestryNode {
    name: String,
    parent: Ancestry,
}

impl Ancestry {
    fn push(&self, name: String) -> Ancestry {
        Ancestry(Some(Rc::new(AncestryNode {
            name,
            parent: self.clone(),
        })))
    }

    fn contains(&self, name: &str) -> bool {
        let mut node = self.0.as_deref();
        while let Some(n) = node {
            if n.name == name {
                return true;
            }
            node = n.parent.0.as_deref();
        }
        false
    }
}

/// Builds import trees over a locator.
#[derive(Debug, Clone)]
pub struct TreeBuilder<'a> {
    locator: &'a PackageLocator,
    include_stdlib: bool,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(locator: &'a PackageLocator) -> Self {
        TreeBuilder {
            locator,
            include_stdlib: false,
        }
    }

    /// Report standard library and cgo imports.
    pub fn include_stdlib(mut self, include: bool) -> Self {
        self.include_stdlib = include;
        self
    }

    /// Start a fresh walk from `root`.
    pub fn walk(&self, root: &PackageInfo) -> TreeWalk<'a> {
        let mut walk = TreeWalk {
            locator: self.locator,
            include_stdlib: self.include_stdlib,
            stack: Vec::new(),
            scanned: HashMap::new(),
        };
        let ancestry = Ancestry::default().push(root.name.clone());
        walk.enter(root.path.clone(), &root.name, 1, ancestry);
        walk
    }
}

struct Frame {
    dir: PathBuf,
    children: std::vec::IntoIter<String>,
    depth: usize,
    ancestry: Ancestry,
}

/// A lazy, depth-first walk of an import graph.
pub struct TreeWalk<'a> {
    locator: &'a PackageLocator,
    include_stdlib: bool,
    stack: Vec<Frame>,
    /// Imports per package directory, shared between diamond branches
    scanned: HashMap<PathBuf, Rc<BTreeSet<String>>>,
}

impl TreeWalk<'_> {
    fn enter(&mut self, dir: PathBuf, name: &str, depth: usize, ancestry: Ancestry) {
        let imports = self.imports_of(&dir);
        let children: Vec<String> = imports.iter().filter(|i| *i != name).cloned().collect();
        self.stack.push(Frame {
            dir,
            children: children.into_iter(),
            depth,
            ancestry,
        });
    }

    fn imports_of(&mut self, base: &Path) -> Rc<BTreeSet<String>> {
        if let Some(imports) = self.scanned.get(base) {
            return Rc::clone(imports);
        }
        let imports = Rc::new(collect_imports(self.locator, base));
        self.scanned.insert(base.to_path_buf(), Rc::clone(&imports));
        imports
    }
}

impl Iterator for TreeWalk<'_> {
    type Item = TreeEntry;

    fn next(&mut self) -> Option<TreeEntry> {
        loop {
            let frame = self.stack.last_mut()?;
            let Some(name) = frame.children.next() else {
                self.stack.pop();
                continue;
            };
            let depth = frame.depth;
            let info = self.locator.resolve(&name, &frame.dir);

            if info.loc == Location::Unknown {
                return Some(TreeEntry {
                    name,
                    info,
                    depth,
                    recursive: false,
                });
            }
            if !self.include_stdlib && info.loc.is_core() {
                continue;
            }

            if frame.ancestry.contains(&info.name) {
                return Some(TreeEntry {
                    name,
                    info,
                    depth,
                    recursive: true,
                });
            }

            if info.loc.is_walkable() && !info.path.as_os_str().is_empty() {
                let ancestry = frame.ancestry.push(info.name.clone());
                self.enter(info.path.clone(), &info.name, depth + 1, ancestry);
            }
            return Some(TreeEntry {
                name,
                info,
                depth,
                recursive: false,
            });
        }
    }
}

/// Imports of every package directory under `base`.
fn collect_imports(locator: &PackageLocator, base: &Path) -> BTreeSet<String> {
    let mut imports = BTreeSet::new();
    for dir in source_dirs(base) {
        if locator.in_stdlib(&dir) {
            continue;
        }

        let pkg = match scan_dir(&dir) {
            Ok(pkg) => pkg,
            Err(ScanError::MultiplePackages { .. }) => {
                debug!("retrying {} with build constraints relaxed", dir.display());
                match scan_dir_tolerant(&dir) {
                    Ok(pkg) => pkg,
                    Err(ScanError::NoBuildableSource { .. }) => continue,
                    Err(e) => {
                        warn!("Error: {} ({})", e, dir.display());
                        continue;
                    }
                }
            }
            Err(ScanError::NoBuildableSource { .. }) => continue,
            Err(e) => {
                warn!("Error: {} ({})", e, dir.display());
                continue;
            }
        };

        for err in &pkg.file_errors {
            warn!("Error: {} ({})", err, dir.display());
        }
        imports.extend(pkg.imports);
    }
    imports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::GoTree;

    fn summarize(walk: TreeWalk<'_>) -> Vec<(String, usize, bool)> {
        walk.map(|e| (e.name, e.depth, e.recursive)).collect()
    }

    #[test]
    fn test_cycle_terminates() {
        let tree = GoTree::new();
        tree.package("src/a", "a", &["b"]);
        tree.package("src/b", "b", &["c"]);
        tree.package("src/c", "c", &["a"]);

        let locator = tree.locator();
        let root = PackageInfo::new("a", tree.path("src/a"), Location::GlobalWorkspace);
        let entries = summarize(TreeBuilder::new(&locator).walk(&root));

        assert_eq!(
            entries,
            vec![
                ("b".to_string(), 1, false),
                ("c".to_string(), 2, false),
                ("a".to_string(), 3, true),
            ]
        );
    }

    #[test]
    fn test_diamond_walks_both_branches() {
        let tree = GoTree::new();
        tree.package("src/root", "root", &["left", "right"]);
        tree.package("src/left", "left", &["shared"]);
        tree.package("src/right", "right", &["shared"]);
        tree.package("src/shared", "shared", &[]);

        let locator = tree.locator();
        let root = PackageInfo::new("root", tree.path("src/root"), Location::GlobalWorkspace);
        let entries = summarize(TreeBuilder::new(&locator).walk(&root));

        assert_eq!(
            entries,
            vec![
                ("left".to_string(), 1, false),
                ("shared".to_string(), 2, false),
                ("right".to_string(), 1, false),
                ("shared".to_string(), 2, false),
            ]
        );
    }

    #[test]
    fn test_stdlib_pruned_unless_requested() {
        let tree = GoTree::new();
        tree.package("src/app", "main", &["fmt", "C", "lib", "example.com/missing"]);
        tree.package("src/lib", "lib", &["os"]);
        tree.stdlib_package("fmt", &["os"]);
        tree.stdlib_package("os", &[]);

        let locator = tree.locator();
        let root = PackageInfo::new("app", tree.path("src/app"), Location::GlobalWorkspace);

        let names: Vec<_> = TreeBuilder::new(&locator)
            .walk(&root)
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["example.com/missing", "lib"]);

        let entries: Vec<_> = TreeBuilder::new(&locator)
            .include_stdlib(true)
            .walk(&root)
            .map(|e| (e.name, e.info.loc, e.depth))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("C".to_string(), Location::Cgo, 1),
                ("example.com/missing".to_string(), Location::Unknown, 1),
                ("fmt".to_string(), Location::StandardLibrary, 1),
                ("lib".to_string(), Location::GlobalWorkspace, 1),
                ("os".to_string(), Location::StandardLibrary, 2),
            ]
        );
    }

    #[test]
    fn test_own_name_and_subdirectories() {
        let tree = GoTree::new();
        tree.package("src/app", "main", &["app", "dep"]);
        tree.package("src/app/internal/util", "util", &["helper"]);
        tree.package("src/app/vendor/hidden", "hidden", &["never"]);
        tree.package("src/app/testdata/x", "x", &["never"]);
        tree.package("src/dep", "dep", &[]);
        tree.package("src/helper", "helper", &[]);

        let locator = tree.locator();
        let root = PackageInfo::new("app", tree.path("src/app"), Location::GlobalWorkspace);
        let names: Vec<_> = TreeBuilder::new(&locator)
            .walk(&root)
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["dep", "helper"]);
    }

    #[test]
    fn test_bad_files_do_not_abort() {
        let tree = GoTree::new();
        tree.package("src/app", "main", &["dep"]);
        tree.file("src/app/broken.go", "not a go file");
        tree.package("src/dep", "dep", &[]);

        let locator = tree.locator();
        let root = PackageInfo::new("app", tree.path("src/app"), Location::GlobalWorkspace);
        let names: Vec<_> = TreeBuilder::new(&locator)
            .walk(&root)
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["dep"]);
    }

    #[test]
    fn test_walk_is_lazy() {
        let tree = GoTree::new();
        tree.package("src/a", "a", &["b", "c"]);
        tree.package("src/b", "b", &[]);
        tree.package("src/c", "c", &[]);

        let locator = tree.locator();
        let root = PackageInfo::new("a", tree.path("src/a"), Location::GlobalWorkspace);
        let mut walk = TreeBuilder::new(&locator).walk(&root);
        assert_eq!(walk.next().map(|e| e.name), Some("b".to_string()));
        drop(walk);

        // A second walk starts over
        let again: Vec<_> = TreeBuilder::new(&locator)
            .walk(&root)
            .map(|e| e.name)
            .collect();
        assert_eq!(again, vec!["b", "c"]);
    }
}
