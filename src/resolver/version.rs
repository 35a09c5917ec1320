//! Semantic version parsing for tags and references.

use semver::Version;

/// Parse a version string, allowing a `v` prefix and incomplete versions.
///
/// Returns `None` for branch names, commit hashes and anything else that is
/// not a semantic version.
pub fn parse_version_lenient(s: &str) -> Option<Version> {
    let s = s.trim();
    let s = s.strip_prefix('v').unwrap_or(s);

    // Try exact parse first
    if let Ok(v) = s.parse() {
        return Some(v);
    }

    // Try adding missing components
    let parts: Vec<&str> = s.split('.').collect();
    match parts.len() {
        1 => {
            let major: u64 = parts[0].parse().ok()?;
            Some(Version::new(major, 0, 0))
        }
        2 => {
            let major: u64 = parts[0].parse().ok()?;
            let minor: u64 = parts[1].parse().ok()?;
            Some(Version::new(major, minor, 0))
        }
        _ => None,
    }
}

/// Check whether a reference string is a semantic version.
pub fn is_semver(s: &str) -> bool {
    parse_version_lenient(s).is_some()
}
