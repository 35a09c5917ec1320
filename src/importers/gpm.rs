//! GPM's plain-text `Godeps` file.
//!
//! One dependency per line: `name [version]`. Only whole-line `#` comments
//! are allowed. A `Godeps` directory belongs to godep and yields nothing.

use std::path::Path;

use tracing::info;

use super::{announce, is_file, merge, read_file, ImportError, Importer};
use crate::core::Dependency;

const GODEPS: &str = "Godeps";

/// Importer for gpm.
#[derive(Debug, Default, Clone, Copy)]
pub struct Gpm;

impl Importer for Gpm {
    fn name(&self) -> &'static str {
        "gpm"
    }

    fn has(&self, dir: &Path) -> bool {
        is_file(&dir.join(GODEPS))
    }

    fn parse(&self, dir: &Path) -> Result<Vec<Dependency>, ImportError> {
        let path = dir.join(GODEPS);
        if path.is_dir() {
            info!("Godeps is a directory. This is probably a Godep project.");
            return Ok(Vec::new());
        }
        if !is_file(&path) {
            return Ok(Vec::new());
        }
        announce("Godeps file", dir, "GPM");

        let content = read_file(&path)?;
        let deps = content.lines().filter_map(parse_line).map(|fields| {
            let mut dep = Dependency::from_import_path(fields[0]);
            if let Some(version) = fields.get(1) {
                dep.reference = version.to_string();
            }
            dep
        });
        Ok(merge(deps))
    }
}

fn parse_line(line: &str) -> Option<Vec<&str>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(line.split_whitespace().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixtures, write_file};
    use tempfile::TempDir;

    #[test]
    fn test_parse_gpm() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), GODEPS, fixtures::GPM_GODEPS);

        assert!(Gpm.has(tmp.path()));
        let deps = Gpm.parse(tmp.path()).unwrap();
        let summary: Vec<_> = deps
            .iter()
            .map(|d| (d.name.as_str(), d.reference.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("github.com/nu7hatch/gotrail", "v0.0.2"),
                ("github.com/replicon/fast-archiver", "v1.02"),
                ("github.com/garyburd/redigo", "master"),
                ("launchpad.net/gocheck", ""),
            ]
        );
        assert!(deps[2].has_subpackage("redis"));
    }

    #[test]
    fn test_godeps_directory_is_not_gpm() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join(GODEPS)).unwrap();
        assert!(!Gpm.has(tmp.path()));
        assert!(Gpm.parse(tmp.path()).unwrap().is_empty());
    }
}
