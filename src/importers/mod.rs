//! Legacy manifest importers.
//!
//! Each importer recognises one dependency file format and turns it into
//! canonical [`Dependency`] records. Import paths naming a subpackage are
//! split with the shared root rule, so declarations of one root merge into a
//! single record with a unioned subpackage set.
//!
//! [`ImportRouter`] tries the native manifest first, then each legacy format
//! in a fixed order. The first format found is authoritative.

pub mod gb;
pub mod godep;
pub mod gom;
pub mod govendor;
pub mod gpm;
pub mod trash;
pub mod vndr;

use std::path::{Path, PathBuf};

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::{ConflictError, Dependencies, Dependency, Manifest, ManifestError};
use crate::util::diagnostic::Diagnostic;
use crate::util::fs::display_relative;

/// Errors reading a dependency file.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ImportError {
    #[error("failed to read file: {}", path.display())]
    #[diagnostic(code(berth::import::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}{}: {message}", path.display(), line_suffix(line))]
    #[diagnostic(
        code(berth::import::parse),
        help("Fix the file by hand or remove it and declare dependencies in berth.yaml")
    )]
    Parse {
        path: PathBuf,
        line: Option<usize>,
        message: String,
    },

    #[error("{}: dependency `{name}` uses {feature}, which is not supported", path.display())]
    #[diagnostic(
        code(berth::import::unsupported),
        help("Remove {feature} from `{name}` and fetch it another way")
    )]
    Unsupported {
        path: PathBuf,
        name: String,
        feature: String,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

fn line_suffix(line: &Option<usize>) -> String {
    line.map(|l| format!(":{}", l)).unwrap_or_default()
}

impl ImportError {
    /// Create a parse error.
    pub fn parse(path: &Path, line: Option<usize>, message: impl Into<String>) -> Self {
        ImportError::Parse {
            path: path.to_path_buf(),
            line,
            message: message.into(),
        }
    }

    /// Render this error with context for the terminal.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ImportError::Conflict(conflict) => Diagnostic::error(format!(
                "conflicting declarations of `{}`",
                conflict.name
            ))
            .with_context(format!("{} `{}`", conflict.field, conflict.first))
            .with_context(format!("{} `{}`", conflict.field, conflict.second))
            .with_suggestion(format!(
                "Keep one {} for `{}` and remove the other declaration",
                conflict.field, conflict.name
            )),
            ImportError::Unsupported {
                path,
                name,
                feature,
            } => Diagnostic::error(format!("`{}` uses {}", name, feature))
                .with_location(path)
                .with_suggestion(format!("Remove {} from `{}`", feature, name))
                .with_suggestion("Declare the dependency in berth.yaml instead"),
            ImportError::Parse { path, .. } => Diagnostic::error(self.to_string())
                .with_location(path)
                .with_suggestion("Fix the file or remove it"),
            other => Diagnostic::error(other.to_string()),
        }
    }
}

/// A dependency file format.
pub trait Importer: Send + Sync {
    /// Short format name, for messages.
    fn name(&self) -> &'static str;

    /// Whether `dir` contains this format's file.
    fn has(&self, dir: &Path) -> bool;

    /// Read the dependencies from `dir`. A directory without the file
    /// yields an empty list.
    fn parse(&self, dir: &Path) -> Result<Vec<Dependency>, ImportError>;
}

/// Dependencies read from one format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Imported {
    pub format: &'static str,
    pub deps: Vec<Dependency>,
}

/// The canonical `berth.yaml`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Native;

impl Importer for Native {
    fn name(&self) -> &'static str {
        "berth"
    }

    fn has(&self, dir: &Path) -> bool {
        Manifest::exists_in(dir)
    }

    fn parse(&self, dir: &Path) -> Result<Vec<Dependency>, ImportError> {
        if !self.has(dir) {
            return Ok(Vec::new());
        }
        let manifest = Manifest::load(&Manifest::path_in(dir))?;
        Ok(Dependencies::dedupe(manifest.imports)?.into_vec())
    }
}

/// Tries each format in priority order.
pub struct ImportRouter {
    importers: Vec<Box<dyn Importer>>,
}

impl Default for ImportRouter {
    fn default() -> Self {
        ImportRouter {
            importers: vec![
                Box::new(Native),
                Box::new(godep::Godep),
                Box::new(gpm::Gpm),
                Box::new(gb::Gb),
                Box::new(gom::Gom),
                Box::new(govendor::Govendor),
                Box::new(trash::Trash),
                Box::new(vndr::Vndr),
            ],
        }
    }
}

impl ImportRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a router over a custom list, tried in order.
    pub fn with_importers(importers: Vec<Box<dyn Importer>>) -> Self {
        ImportRouter { importers }
    }

    /// Names of the formats, in priority order.
    pub fn formats(&self) -> Vec<&'static str> {
        self.importers.iter().map(|i| i.name()).collect()
    }

    /// Read dependencies from the first format present in `dir`.
    pub fn import(&self, dir: &Path) -> Result<Option<Imported>, ImportError> {
        for importer in &self.importers {
            if importer.has(dir) {
                let deps = importer.parse(dir)?;
                return Ok(Some(Imported {
                    format: importer.name(),
                    deps,
                }));
            }
        }
        Ok(None)
    }
}

/// Fold declarations of one root into a single record. Legacy formats pin
/// each package on its own, so the first declaration's reference and source
/// are kept and later ones only add subpackages.
pub(crate) fn merge(deps: impl IntoIterator<Item = Dependency>) -> Vec<Dependency> {
    let mut out: Vec<Dependency> = Vec::new();
    for dep in deps {
        match out.iter_mut().find(|d| d.name == dep.name) {
            Some(first) => {
                if !dep.reference.is_empty() && dep.reference != first.reference {
                    debug!(
                        "keeping {} at `{}`, ignoring `{}`",
                        first.name, first.reference, dep.reference
                    );
                }
                first.subpackages.extend(dep.subpackages);
            }
            None => out.push(dep),
        }
    }
    out
}

pub(crate) fn read_file(path: &Path) -> Result<String, ImportError> {
    std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn announce(file: &str, dir: &Path, format: &str) {
    info!("Found {} in {}", file, display_relative(dir));
    info!("--> Parsing {} metadata...", format);
}

pub(crate) fn is_file(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file()).unwrap_or(false)
}
