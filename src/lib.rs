//! berth - dependency resolution for Go workspaces
//!
//! This crate provides the core library functionality for berth:
//! locating packages across vendor trees and workspaces, walking import
//! trees, reading legacy dependency files, and sharing a repository cache
//! safely between processes.

pub mod cache;
pub mod core;
pub mod importers;
pub mod ops;
pub mod resolver;
pub mod sources;
pub mod util;

/// Test utilities and mocks for berth unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides fake workspace trees, dependency file
/// fixtures and a mock repository client.
#[cfg(test)]
pub mod test_support;

pub use core::{Dependency, Location, Manifest, PackageInfo};
pub use resolver::{LocatorConfig, PackageLocator, TreeBuilder};
pub use util::context::GlobalContext;
