//! Core data structures.

pub mod dependency;
pub mod import_path;
pub mod manifest;
pub mod package_info;

pub use dependency::{ConflictError, Dependencies, Dependency};
pub use import_path::normalize_name;
pub use manifest::{Manifest, ManifestError};
pub use package_info::{Location, PackageInfo};
