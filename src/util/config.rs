//! Configuration file support for berth.
//!
//! berth reads two configuration files:
//! - Global: `~/.berth/config.toml` - User-wide defaults
//! - Project: `.berth/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and the `GOPATH`,
//! `GOROOT` and `BERTH_HOME` environment variables take precedence over both.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Directory name for berth's own files, under the home or project directory.
pub const BERTH_DIR: &str = ".berth";

/// berth configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where packages are looked up
    pub paths: PathsConfig,

    /// Shared cache settings
    pub cache: CacheConfig,

    /// Tree walk settings
    pub resolve: ResolveConfig,
}

/// Package search roots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Global workspace roots, each holding a `src/` tree
    pub workspace: Vec<PathBuf>,

    /// Standard distribution roots
    pub stdlib: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// berth home holding the cache and its lock
    pub home: Option<PathBuf>,

    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Report standard library packages in trees
    pub include_stdlib: Option<bool>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if !other.paths.workspace.is_empty() {
            self.paths.workspace = other.paths.workspace;
        }
        if !other.paths.stdlib.is_empty() {
            self.paths.stdlib = other.paths.stdlib;
        }
        if other.cache.home.is_some() {
            self.cache.home = other.cache.home;
        }
        if other.cache.enabled.is_some() {
            self.cache.enabled = other.cache.enabled;
        }
        if other.resolve.include_stdlib.is_some() {
            self.resolve.include_stdlib = other.resolve.include_stdlib;
        }
    }

    /// Apply `GOPATH`, `GOROOT` and `BERTH_HOME` from `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<OsString>) {
        if let Some(gopath) = lookup("GOPATH").filter(|v| !v.is_empty()) {
            self.paths.workspace = std::env::split_paths(&gopath).collect();
        }
        if let Some(goroot) = lookup("GOROOT").filter(|v| !v.is_empty()) {
            self.paths.stdlib = vec![PathBuf::from(goroot)];
        }
        if let Some(home) = lookup("BERTH_HOME").filter(|v| !v.is_empty()) {
            self.cache.home = Some(PathBuf::from(home));
        }
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.enabled.unwrap_or(true)
    }

    pub fn include_stdlib(&self) -> bool {
        self.resolve.include_stdlib.unwrap_or(false)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.berth/config.toml)
/// 2. Global config (~/.berth/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }
    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global berth directory (~/.berth).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(BERTH_DIR))
}

/// Get the global config path (~/.berth/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.berth/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(BERTH_DIR).join("config.toml")
}

/// Workspace root used when none is configured (~/go).
pub fn default_workspace() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join("go"))
}
