//! Gom's `Gomfile`, a small Ruby-flavoured DSL.
//!
//! ```text
//! gom 'github.com/a/b', :commit => '1f2e3d'
//! group :development, :production do
//!   gom 'github.com/c/d', :goos => [:linux, :darwin]
//! end
//! ```
//!
//! `Gomfile.lock` uses the same grammar and is preferred when present.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use super::{announce, is_file, merge, read_file, ImportError, Importer};
use crate::core::Dependency;

const GOMFILE: &str = "Gomfile";
const GOMFILE_LOCK: &str = "Gomfile.lock";

/// Groups that contribute dependencies; everything else is skipped.
const KEPT_GROUPS: [&str; 2] = ["development", "production"];

const QUOTED: &str = r#"'[^']*'|"[^"]*""#;
const SYMBOL: &str = r":[a-z][a-z0-9_]*";

static GROUP_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^group\s+((?:{SYMBOL})(?:\s*,\s*{SYMBOL})*)\s+do$"
    ))
    .expect("group pattern is valid")
});

static END_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^end$").expect("end pattern is valid"));

static GOM_LINE: LazyLock<Regex> = LazyLock::new(|| {
    let list = format!(r"\[\s*(?:{SYMBOL}(?:\s*,\s*{SYMBOL})*)?\s*\]");
    Regex::new(&format!(
        r"^gom\s+({QUOTED})((?:\s*,\s*{SYMBOL}\s*=>\s*(?:{QUOTED}|{list}))*)\s*$"
    ))
    .expect("gom pattern is valid")
});

static OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"({SYMBOL})\s*=>\s*({QUOTED}|\[[^\]]*\])"
    ))
    .expect("option pattern is valid")
});

static SYMBOLS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SYMBOL).expect("symbol pattern is valid"));

/// An option value: a quoted string or a list of symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
enum OptionValue {
    Str(String),
    List(Vec<String>),
}

impl OptionValue {
    fn parse(raw: &str) -> Self {
        if raw.starts_with('[') {
            OptionValue::List(symbols(raw))
        } else {
            OptionValue::Str(unquote(raw).to_string())
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            OptionValue::List(_) => None,
        }
    }

    fn into_list(self) -> Vec<String> {
        match self {
            OptionValue::Str(s) => vec![s],
            OptionValue::List(items) => items,
        }
    }
}

/// One `gom` line with its options.
#[derive(Debug, Clone, PartialEq, Eq)]
struct GomEntry {
    name: String,
    options: HashMap<String, OptionValue>,
    groups: Vec<String>,
}

/// Importer for gom.
#[derive(Debug, Default, Clone, Copy)]
pub struct Gom;

impl Importer for Gom {
    fn name(&self) -> &'static str {
        "gom"
    }

    fn has(&self, dir: &Path) -> bool {
        is_file(&dir.join(GOMFILE)) || is_file(&dir.join(GOMFILE_LOCK))
    }

    fn parse(&self, dir: &Path) -> Result<Vec<Dependency>, ImportError> {
        let lock = dir.join(GOMFILE_LOCK);
        let path = if is_file(&lock) {
            lock
        } else {
            dir.join(GOMFILE)
        };
        if !is_file(&path) {
            return Ok(Vec::new());
        }
        announce("Gomfile", dir, "Gom");

        let content = read_file(&path)?;
        let entries = parse_gomfile(&content, &path)?;

        let mut deps = Vec::new();
        for mut entry in entries {
            if entry.options.get("skipdep").and_then(OptionValue::as_str) == Some("true") {
                continue;
            }
            if entry.options.contains_key("command") {
                return Err(ImportError::Unsupported {
                    path,
                    name: entry.name,
                    feature: "a custom fetch command".to_string(),
                });
            }
            if !entry.groups.is_empty()
                && !entry.groups.iter().any(|g| KEPT_GROUPS.contains(&g.as_str()))
            {
                info!(
                    "Skipping dependency '{}' because it isn't in the development or production group",
                    entry.name
                );
                continue;
            }

            let mut dep = Dependency::from_import_path(&entry.name);
            let pinned = ["tag", "commit"]
                .iter()
                .find_map(|key| entry.options.get(*key).and_then(OptionValue::as_str));
            if let Some(reference) = pinned {
                dep.reference = reference.to_string();
            } else if let Some(branch) = entry.options.get("branch").and_then(OptionValue::as_str) {
                dep.reference = branch.to_string();
            }
            if let Some(os) = entry.options.remove("goos") {
                dep.os = os.into_list();
            }
            if let Some(arch) = entry.options.remove("goarch") {
                dep.arch = arch.into_list();
            }
            deps.push(dep);
        }
        Ok(merge(deps))
    }
}

fn parse_gomfile(content: &str, path: &Path) -> Result<Vec<GomEntry>, ImportError> {
    let mut entries = Vec::new();
    let mut groups: Option<Vec<String>> = None;

    for (index, raw) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(caps) = GROUP_LINE.captures(line) {
            if groups.is_some() {
                return Err(ImportError::parse(path, Some(line_no), "nested group"));
            }
            groups = Some(symbols(&caps[1]));
        } else if END_LINE.is_match(line) {
            if groups.take().is_none() {
                return Err(ImportError::parse(path, Some(line_no), "unexpected `end`"));
            }
        } else if let Some(caps) = GOM_LINE.captures(line) {
            let mut options: HashMap<String, OptionValue> = OPTION
                .captures_iter(&caps[2])
                .map(|opt| (opt[1][1..].to_string(), OptionValue::parse(&opt[2])))
                .collect();
            let mut entry_groups = groups.clone().unwrap_or_default();
            if let Some(explicit) = options.remove("group") {
                entry_groups.extend(explicit.into_list());
            }
            entries.push(GomEntry {
                name: unquote(&caps[1]).to_string(),
                options,
                groups: entry_groups,
            });
        } else {
            return Err(ImportError::parse(path, Some(line_no), "syntax error"));
        }
    }
    Ok(entries)
}

fn unquote(s: &str) -> &str {
    s.trim_matches(|c| c == '\'' || c == '"')
}

fn symbols(s: &str) -> Vec<String> {
    SYMBOLS
        .find_iter(s)
        .map(|m| m.as_str()[1..].to_string())
        .collect()
}
