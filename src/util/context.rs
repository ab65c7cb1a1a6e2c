//! Global context for Anvil operations.
//!
//! Provides centralized access to configuration, paths, and environment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::{find_manifest, MANIFEST_NAME};
use crate::util::config::{self, Config, CONFIG_DIR_NAME};

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global Anvil data (~/.anvil/)
    home: PathBuf,

    /// Binary package store, when not the default under `home`
    store_dir: Option<PathBuf>,

    /// Whether to use verbose output
    verbose: bool,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        let home = config::global_config_dir().unwrap_or_else(|| cwd.join(CONFIG_DIR_NAME));

        Ok(GlobalContext {
            cwd,
            home,
            store_dir: None,
            verbose: false,
        })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Override the home directory.
    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.home = home;
        self
    }

    /// Use a specific package store.
    pub fn with_store_dir(mut self, store_dir: PathBuf) -> Self {
        self.store_dir = Some(store_dir);
        self
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the Anvil home directory (~/.anvil/).
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Binary package store (`~/.anvil/store` unless overridden).
    pub fn store_dir(&self) -> PathBuf {
        self.store_dir
            .clone()
            .unwrap_or_else(|| self.home.join("store"))
    }

    /// Default package index directory.
    pub fn default_index_dir(&self) -> PathBuf {
        self.home.join("index")
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Load the merged global and project configuration for `project_root`.
    pub fn load_config(&self, project_root: &Path) -> Result<Config> {
        config::load_config(&self.config_path(), &config::project_config_path(project_root))
    }

    /// Find the recipe starting from cwd and searching upward.
    pub fn find_manifest(&self) -> Result<PathBuf> {
        find_manifest(&self.cwd).with_context(|| {
            format!(
                "could not find `{}` in `{}` or any parent directory",
                MANIFEST_NAME,
                self.cwd.display()
            )
        })
    }
}
