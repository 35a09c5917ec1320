//! Package location and import graph walking.

pub mod locator;
pub mod scan;
pub mod tree;
pub mod version;

pub use locator::{LocatorConfig, PackageLocator};
pub use tree::{TreeBuilder, TreeEntry, TreeWalk};
pub use version::parse_version_lenient;
