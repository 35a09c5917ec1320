//! govendor's `vendor/vendor.json`.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::{announce, is_file, merge, read_file, ImportError, Importer};
use crate::core::Dependency;

const VENDOR_JSON: &str = "vendor/vendor.json";

#[derive(Debug, Deserialize)]
struct VendorFile {
    #[serde(default)]
    package: Vec<VendorPackage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct VendorPackage {
    /// Where the package was fetched from, when not `path`
    origin: String,
    path: String,
    revision: String,
    version: String,
    version_exact: String,
}

impl VendorPackage {
    fn import_path(&self) -> &str {
        if self.origin.is_empty() {
            &self.path
        } else {
            &self.origin
        }
    }

    /// The most precise pin: exact version, then version, then revision.
    fn reference(&self) -> &str {
        [&self.version_exact, &self.version, &self.revision]
            .into_iter()
            .find(|r| !r.is_empty())
            .map_or("", String::as_str)
    }
}

/// Importer for govendor.
#[derive(Debug, Default, Clone, Copy)]
pub struct Govendor;

impl Importer for Govendor {
    fn name(&self) -> &'static str {
        "govendor"
    }

    fn has(&self, dir: &Path) -> bool {
        dir.join(VENDOR_JSON).exists()
    }

    fn parse(&self, dir: &Path) -> Result<Vec<Dependency>, ImportError> {
        let path = dir.join(VENDOR_JSON);
        if !is_file(&path) {
            return Ok(Vec::new());
        }
        announce("govendor vendor.json file", dir, "govendor");

        let content = read_file(&path)?;
        let file: VendorFile = serde_json::from_str(&content)
            .map_err(|e| ImportError::parse(&path, Some(e.line()), e.to_string()))?;

        let deps = file
            .package
            .iter()
            .filter(|pkg| !pkg.import_path().is_empty())
            .map(|pkg| {
                debug!("Parsing {}", pkg.import_path());
                Dependency::from_import_path(pkg.import_path()).with_reference(pkg.reference())
            });
        Ok(merge(deps))
    }
}
