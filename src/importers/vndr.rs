//! vndr's `vendor.conf`: `name version [repo]` per line.

use std::path::Path;

use super::trash::{self, VENDOR_CONF};
use super::{announce, is_file, merge, read_file, ImportError, Importer};
use crate::core::Dependency;

/// Importer for vndr.
#[derive(Debug, Default, Clone, Copy)]
pub struct Vndr;

impl Importer for Vndr {
    fn name(&self) -> &'static str {
        "vndr"
    }

    fn has(&self, dir: &Path) -> bool {
        let path = dir.join(VENDOR_CONF);
        is_file(&path) && std::fs::read_to_string(&path).is_ok_and(|c| !trash::detect(&c))
    }

    fn parse(&self, dir: &Path) -> Result<Vec<Dependency>, ImportError> {
        let path = dir.join(VENDOR_CONF);
        if !is_file(&path) {
            return Ok(Vec::new());
        }
        announce("vndr config file", dir, "vndr");

        let content = read_file(&path)?;
        let mut deps = Vec::new();
        for (index, raw) in content.lines().enumerate() {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let line = trimmed.split('#').next().unwrap_or_default();
            let fields: Vec<&str> = line.split_whitespace().collect();
            let dep = match fields.as_slice() {
                [name, version] => Dependency::from_import_path(name).with_reference(*version),
                [name, version, repo] => Dependency::from_import_path(name)
                    .with_reference(*version)
                    .with_repository(*repo),
                _ => {
                    return Err(ImportError::parse(
                        &path,
                        Some(index + 1),
                        format!("invalid config format: {}", raw),
                    ))
                }
            };
            deps.push(dep);
        }
        Ok(merge(deps))
    }
}
