//! Import path handling.
//!
//! An import path such as `github.com/owner/repo/sub/pkg` names a
//! subpackage of an independently versioned root (`github.com/owner/repo`).
//! Every importer and the manifest use the same rule to split the two, so
//! that declarations differing only in subpackage merge into one dependency.

use std::sync::LazyLock;

use regex::Regex;

/// Host-specific root rules, tried in order. Capture group 1 is the root.
static ROOT_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^(github\.com/[A-Za-z0-9_.\-]+/[A-Za-z0-9_.\-]+)(/[A-Za-z0-9_.\-]+)*$",
        r"^(bitbucket\.org/[A-Za-z0-9_.\-]+/[A-Za-z0-9_.\-]+)(/[A-Za-z0-9_.\-]+)*$",
        r"^(launchpad\.net/(?:[A-Za-z0-9_.\-]+(?:/[A-Za-z0-9_.\-]+)?|~[A-Za-z0-9_.\-]+/(?:\+junk|[A-Za-z0-9_.\-]+)/[A-Za-z0-9_.\-]+))(/[A-Za-z0-9_.\-]+)*$",
        r"^(git\.launchpad\.net/(?:[A-Za-z0-9_.\-]+|~[A-Za-z0-9_.\-]+/(?:\+git|[A-Za-z0-9_.\-]+)/[A-Za-z0-9_.\-]+))$",
        r"^(hub\.jazz\.net/git/[a-z0-9]+/[A-Za-z0-9_.\-]+)(/[A-Za-z0-9_.\-]+)*$",
        r"^(go\.googlesource\.com/[A-Za-z0-9_.\-]+/?)$",
        r"^(code\.google\.com/[pr]/[a-z0-9\-]+(?:\.[a-z0-9\-]+)?)(/[A-Za-z0-9_.\-]+)*$",
        r"^([a-z0-9_\-.]+\.googlecode\.com/svn(?:/.*)?)$",
        r"^([a-z0-9_\-.]+\.googlecode\.com/(?:git|hg))(/.*)?$",
        // Vanity hosts whose layout is fixed and known without a network lookup
        r"^(golang\.org/x/[A-Za-z0-9_.\-]+)(/[A-Za-z0-9_.\-]+)*$",
        r"^(google\.golang\.org/[A-Za-z0-9_.\-]+)(/[A-Za-z0-9_.\-]+)*$",
        r"^(go\.uber\.org/[A-Za-z0-9_.\-]+)(/[A-Za-z0-9_.\-]+)*$",
        r"^(k8s\.io/[A-Za-z0-9_.\-]+)(/[A-Za-z0-9_.\-]+)*$",
        r"^(gopkg\.in/(?:[A-Za-z0-9_\-]+/)?[A-Za-z0-9_\-.]+\.v[0-9]+)(/[A-Za-z0-9_.\-]+)*$",
        // Generic: the VCS is named by an extension on the path
        r"^((?:[a-z0-9.\-]+\.)+[a-z0-9.\-]+(?::[0-9]+)?/[A-Za-z0-9_.\-/]*?\.(?:bzr|git|hg|svn))(/[A-Za-z0-9_.\-]+)*$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("root rule patterns are valid"))
    .collect()
});

/// Convert platform separators to forward slashes.
pub fn to_slash(name: &str) -> String {
    name.replace('\\', "/")
}

/// Find the root package for an import path.
///
/// `github.com/Masterminds/cookoo/io` has its root at
/// `github.com/Masterminds/cookoo`. Paths no rule recognises are their own
/// root.
pub fn root_from_package(pkg: &str) -> String {
    let pkg = to_slash(pkg);
    for rule in ROOT_RULES.iter() {
        if let Some(root) = rule.captures(&pkg).and_then(|c| c.get(1)) {
            if !root.as_str().is_empty() {
                return root.as_str().to_string();
            }
        }
    }
    pkg
}

/// Split an import path into its root and subpackage.
///
/// The subpackage is empty when the path names the root itself.
///
/// ```
/// use berth::core::import_path::normalize_name;
///
/// let (root, sub) = normalize_name("golang.org/x/crypto/ssh");
/// assert_eq!(root, "golang.org/x/crypto");
/// assert_eq!(sub, "ssh");
/// ```
pub fn normalize_name(name: &str) -> (String, String) {
    let name = to_slash(name);
    let root = root_from_package(&name);
    let extra = name.strip_prefix(root.as_str()).unwrap_or("");
    let sub = match extra.trim_start_matches('/') {
        "" => String::new(),
        s => s.to_string(),
    };
    (root, sub)
}
