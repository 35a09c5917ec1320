//! Trash's `vendor.conf`.
//!
//! Two dialects share the file name. The YAML dialect is a mapping:
//!
//! ```yaml
//! package: github.com/me/app
//! import:
//!   - package: github.com/a/b
//!     version: v1.0.0
//!     repo: https://github.com/fork/b
//! exclude:
//!   - .git
//! ```
//!
//! The line dialect is whitespace separated. The first single-field line
//! names the project, `-pattern` lines are excludes and the rest are
//! `package [version [repo]]`. `#` starts a comment anywhere on a line.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use super::{announce, is_file, merge, read_file, ImportError, Importer};
use crate::core::Dependency;

pub(crate) const VENDOR_CONF: &str = "vendor.conf";

/// One imported package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TrashImport {
    pub package: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub repo: String,
}

/// A parsed trash configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TrashConf {
    #[serde(default)]
    pub package: String,
    #[serde(rename = "import", default)]
    pub imports: Vec<TrashImport>,
    #[serde(rename = "exclude", default)]
    pub excludes: Vec<String>,
    /// Whether the YAML dialect was used
    #[serde(skip)]
    pub yaml: bool,
}

impl TrashConf {
    /// Parse either dialect. Imports come back unique and sorted by package.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ImportError> {
        let mut conf = if is_yaml_mapping(content) {
            let mut conf: TrashConf = serde_yaml::from_str(content).map_err(|e| {
                let line = e.location().map(|l| l.line());
                ImportError::parse(path, line, e.to_string())
            })?;
            conf.yaml = true;
            conf
        } else {
            parse_lines(content)
        };

        let mut seen = HashSet::new();
        conf.imports.retain(|i| seen.insert(i.package.clone()));
        conf.imports.sort_by(|a, b| a.package.cmp(&b.package));
        Ok(conf)
    }
}

/// Whether `vendor.conf` content is trash's rather than vndr's.
pub fn detect(content: &str) -> bool {
    if is_yaml_mapping(content) {
        return true;
    }
    content.lines().map(strip_comment).any(|line| {
        line.starts_with('-') || line.split_whitespace().count() == 1
    })
}

/// Importer for trash.
#[derive(Debug, Default, Clone, Copy)]
pub struct Trash;

impl Importer for Trash {
    fn name(&self) -> &'static str {
        "trash"
    }

    fn has(&self, dir: &Path) -> bool {
        let path = dir.join(VENDOR_CONF);
        is_file(&path) && std::fs::read_to_string(&path).is_ok_and(|c| detect(&c))
    }

    fn parse(&self, dir: &Path) -> Result<Vec<Dependency>, ImportError> {
        let path = dir.join(VENDOR_CONF);
        if !is_file(&path) {
            return Ok(Vec::new());
        }
        announce("Trash config file", dir, "Trash");

        let content = read_file(&path)?;
        let conf = TrashConf::parse(&content, &path)?;
        let deps = conf.imports.into_iter().map(|i| {
            Dependency::from_import_path(&i.package)
                .with_reference(i.version)
                .with_repository(i.repo)
        });
        Ok(merge(deps))
    }
}

fn is_yaml_mapping(content: &str) -> bool {
    serde_yaml::from_str::<serde_yaml::Value>(content).is_ok_and(|v| v.is_mapping())
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(i) => line[..i].trim(),
        None => line.trim(),
    }
}

fn parse_lines(content: &str) -> TrashConf {
    let mut conf = TrashConf::default();
    for line in content.lines().map(strip_comment) {
        if line.is_empty() {
            continue;
        }
        if let Some(pattern) = line.strip_prefix('-') {
            conf.excludes.push(pattern.trim().to_string());
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() == 1 && conf.package.is_empty() {
            conf.package = fields[0].to_string();
            continue;
        }
        conf.imports.push(TrashImport {
            package: fields[0].to_string(),
            version: fields.get(1).map(|s| s.to_string()).unwrap_or_default(),
            repo: fields.get(2).map(|s| s.to_string()).unwrap_or_default(),
        });
    }
    conf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixtures, write_file};
    use tempfile::TempDir;

    #[test]
    fn test_line_dialect() {
        let conf = TrashConf::parse(fixtures::TRASH_CONF, Path::new(VENDOR_CONF)).unwrap();
        assert!(!conf.yaml);
        assert_eq!(conf.package, "github.com/rancher/trash");
        assert_eq!(conf.excludes, vec!["vendor/github.com/x/bad"]);

        let packages: Vec<_> = conf.imports.iter().map(|i| i.package.as_str()).collect();
        assert_eq!(
            packages,
            vec![
                "github.com/Sirupsen/logrus",
                "github.com/cloudfoundry-incubator/candiedyaml",
                "gopkg.in/check.v1",
            ]
        );
        let logrus = &conf.imports[0];
        assert_eq!(logrus.version, "v0.10.0");
        assert_eq!(logrus.repo, "https://github.com/imikushin/logrus.git");
    }

    #[test]
    fn test_yaml_dialect() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), VENDOR_CONF, fixtures::TRASH_YAML);

        assert!(Trash.has(tmp.path()));
        let conf = TrashConf::parse(fixtures::TRASH_YAML, Path::new(VENDOR_CONF)).unwrap();
        assert!(conf.yaml);
        assert_eq!(conf.excludes, vec![".git"]);

        let deps = Trash.parse(tmp.path()).unwrap();
        let names: Vec<_> = deps.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["github.com/a/b", "github.com/c/d"]);
        assert_eq!(deps[0].reference, "v1.0.0");
        assert_eq!(deps[0].repository, "https://github.com/fork/b");
    }

    #[test]
    fn test_first_seen_wins() {
        let conf = TrashConf::parse(
            "github.com/a/b v2\ngithub.com/a/b v1\n",
            Path::new(VENDOR_CONF),
        )
        .unwrap();
        assert_eq!(conf.imports.len(), 1);
        assert_eq!(conf.imports[0].version, "v2");
    }

    #[test]
    fn test_detect() {
        assert!(detect("package: github.com/me/app\n"));
        assert!(detect("github.com/me/app\ngithub.com/a/b v1\n"));
        assert!(detect("github.com/a/b v1\n-vendor/x\n"));
        assert!(!detect("github.com/a/b v1\ngithub.com/c/d v2 https://x # pinned\n"));
        assert!(!detect("# only a comment\n"));
    }

    #[test]
    fn test_vndr_file_not_claimed() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), VENDOR_CONF, fixtures::VNDR_CONF);
        assert!(!Trash.has(tmp.path()));
    }
}
