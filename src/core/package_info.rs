//! Resolution result for a single import name.

use std::fmt;
use std::path::PathBuf;

/// Where an import name was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    /// `./` or `../` import, relative to the importing directory
    Relative,
    /// Inside a `vendor/` directory of the project or one of its ancestors
    Vendor,
    /// Under `<workspace>/src/`
    GlobalWorkspace,
    /// Under `<stdlib>/src/`, or a name that moved into the standard library
    StandardLibrary,
    /// The pseudo-package `C`
    Cgo,
    /// The legacy App Engine SDK namespace
    LegacyPlatformSDK,
    /// Not found anywhere
    Unknown,
}

impl Location {
    /// Whether a tree walk should descend into packages at this location.
    pub fn is_walkable(self) -> bool {
        matches!(
            self,
            Location::Vendor | Location::GlobalWorkspace | Location::StandardLibrary
        )
    }

    /// Whether this location belongs to the language distribution itself.
    pub fn is_core(self) -> bool {
        matches!(self, Location::StandardLibrary | Location::Cgo)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Location::Relative => "relative",
            Location::Vendor => "vendor",
            Location::GlobalWorkspace => "workspace",
            Location::StandardLibrary => "stdlib",
            Location::Cgo => "cgo",
            Location::LegacyPlatformSDK => "appengine",
            Location::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// The resolved location of one import name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub name: String,
    /// Empty when the name is unresolved
    pub path: PathBuf,
    pub loc: Location,
    pub vendored: bool,
}

impl PackageInfo {
    /// Create a resolution result. `vendored` follows the location.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, loc: Location) -> Self {
        PackageInfo {
            name: name.into(),
            path: path.into(),
            loc,
            vendored: loc == Location::Vendor,
        }
    }

    /// An unresolved name.
    pub fn unknown(name: impl Into<String>) -> Self {
        PackageInfo::new(name, PathBuf::new(), Location::Unknown)
    }

    /// Whether the name was found somewhere.
    pub fn is_resolved(&self) -> bool {
        self.loc != Location::Unknown
    }
}
