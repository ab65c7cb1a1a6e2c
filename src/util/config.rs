//! Configuration file support for Anvil.
//!
//! Anvil reads two configuration files:
//! - Global: `~/.anvil/config.toml` - user-wide defaults
//! - Project: `.anvil/config.toml` - project-specific overrides
//!
//! Project config takes precedence over global config. Settings from either
//! file sit below the recipe's own `[settings]` and command-line overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::{RawSettings, SettingsPolicy};
use crate::util::fs::read_to_string;

/// Name of the per-user and per-project configuration directory.
pub const CONFIG_DIR_NAME: &str = ".anvil";

/// Anvil configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default settings and the build-type allow-list
    pub settings: SettingsConfig,

    /// Build settings
    pub build: BuildConfig,

    /// Store and index locations
    pub paths: PathsConfig,
}

/// The `[settings]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    #[serde(flatten)]
    pub defaults: RawSettings,

    /// Allowed build types; the built-in list when unset.
    pub build_types: Option<Vec<String>>,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Default number of parallel jobs (None = let the build tool decide)
    pub jobs: Option<usize>,
}

/// Filesystem locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Binary package store
    pub store: Option<PathBuf>,

    /// Package index directory
    pub index: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Relative paths in `[paths]` are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;

        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.paths.store = config.paths.store.map(|p| base.join(p));
            config.paths.index = config.paths.index.map(|p| base.join(p));
        }
        Ok(config)
    }

    /// Load configuration, or defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        self.settings.defaults = std::mem::take(&mut self.settings.defaults).merge(other.settings.defaults);
        if other.settings.build_types.is_some() {
            self.settings.build_types = other.settings.build_types;
        }
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.paths.store.is_some() {
            self.paths.store = other.paths.store;
        }
        if other.paths.index.is_some() {
            self.paths.index = other.paths.index;
        }
    }

    /// The settings policy this configuration describes.
    pub fn policy(&self) -> SettingsPolicy {
        match self.settings.build_types {
            Some(ref types) => SettingsPolicy::with_build_types(types.iter().cloned()),
            None => SettingsPolicy::default(),
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.anvil/config.toml)
/// 2. Global config (~/.anvil/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Result<Config> {
    let mut config = Config::load_or_default(global_path)?;
    config.merge(Config::load_or_default(project_path)?);
    Ok(config)
}

/// The global anvil directory: `$ANVIL_HOME`, or `~/.anvil`.
pub fn global_config_dir() -> Option<PathBuf> {
    if let Some(home) = std::env::var_os("ANVIL_HOME") {
        return Some(PathBuf::from(home));
    }
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR_NAME))
}

/// The project config path (`.anvil/config.toml`).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR_NAME).join("config.toml")
}
