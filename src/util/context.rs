//! Global context for berth operations.
//!
//! Provides centralized access to configuration, paths, and environment.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use tracing::debug;

use crate::cache::{CacheHome, CacheLock};
use crate::resolver::LocatorConfig;
use crate::util::config::{
    default_workspace, global_config_dir, global_config_path, load_config, project_config_path,
    Config, BERTH_DIR,
};
use crate::util::process::{find_go, go_env};

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// berth home (~/.berth/ unless configured)
    home: PathBuf,

    /// Merged configuration, environment applied
    config: Config,

    /// Whether to use colors in output
    color: bool,

    /// The process-wide lock over `home`
    lock: CacheLock,

    /// Standard roots reported by `go env GOROOT`
    detected_stdlib: OnceLock<Vec<PathBuf>>,
}

impl GlobalContext {
    /// Create a context for the current directory from config files and
    /// the environment.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::load(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        if !cwd.is_dir() {
            anyhow::bail!("not a directory: {}", cwd.display());
        }
        Ok(Self::load(cwd))
    }

    fn load(cwd: PathBuf) -> Self {
        let global = global_config_path();
        let mut config = load_config(global.as_deref(), &project_config_path(&cwd));
        config.apply_env(|key| std::env::var_os(key));
        Self::from_config(cwd, config)
    }

    /// Create a context from an already-merged configuration.
    pub fn from_config(cwd: PathBuf, config: Config) -> Self {
        let home = config
            .cache
            .home
            .clone()
            .or_else(global_config_dir)
            .unwrap_or_else(|| PathBuf::from(BERTH_DIR));
        let lock = CacheLock::new(&home);
        GlobalContext {
            cwd,
            home,
            config,
            color: true,
            lock,
            detected_stdlib: OnceLock::new(),
        }
    }

    /// Set color output.
    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the berth home directory.
    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check if color output is enabled.
    pub fn color(&self) -> bool {
        self.color
    }

    /// Resolve a path argument against the working directory.
    pub fn resolve_dir(&self, dir: Option<&Path>) -> PathBuf {
        match dir {
            Some(dir) => self.cwd.join(dir),
            None => self.cwd.clone(),
        }
    }

    /// Global workspace roots, defaulting to `~/go`.
    pub fn workspace_roots(&self) -> Vec<PathBuf> {
        if !self.config.paths.workspace.is_empty() {
            return self.config.paths.workspace.clone();
        }
        default_workspace().into_iter().collect()
    }

    /// Standard distribution roots, asking `go env GOROOT` when none is
    /// configured.
    pub fn stdlib_roots(&self) -> Vec<PathBuf> {
        if !self.config.paths.stdlib.is_empty() {
            return self.config.paths.stdlib.clone();
        }
        self.detected_stdlib.get_or_init(detect_goroot).clone()
    }

    /// Search roots for the package locator.
    pub fn locator_config(&self) -> LocatorConfig {
        let config = self
            .workspace_roots()
            .into_iter()
            .fold(LocatorConfig::new(), LocatorConfig::with_workspace);
        self.stdlib_roots()
            .into_iter()
            .fold(config, LocatorConfig::with_stdlib)
    }

    /// The shared cache under the berth home.
    pub fn cache_home(&self) -> CacheHome {
        CacheHome::new(&self.home).with_enabled(self.config.cache_enabled())
    }

    /// The process-wide cache lock. Every clone refers to the same lock.
    pub fn cache_lock(&self) -> CacheLock {
        self.lock.clone()
    }
}

fn detect_goroot() -> Vec<PathBuf> {
    let Some(go) = find_go() else {
        debug!("go not found; standard library lookups disabled");
        return Vec::new();
    };
    match go_env(&go, "GOROOT") {
        Ok(root) if !root.is_empty() => vec![PathBuf::from(root)],
        Ok(_) => Vec::new(),
        Err(e) => {
            debug!("could not determine GOROOT: {:#}", e);
            Vec::new()
        }
    }
}
