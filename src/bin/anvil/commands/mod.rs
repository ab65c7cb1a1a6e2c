//! Command implementations

pub mod build;
pub mod generate;
pub mod layout;
pub mod resolve;

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::cli::ProjectArgs;
use anvil::core::Manifest;
use anvil::ops;
use anvil::sources::DirectoryIndex;
use anvil::util::{Config, GlobalContext};
use anvil::Settings;

/// A loaded recipe with its configuration and effective settings.
pub struct Project {
    pub ctx: GlobalContext,
    pub manifest: Manifest,
    pub config: Config,
    pub settings: Settings,
    index_override: Option<PathBuf>,
}

impl Project {
    pub fn load(args: &ProjectArgs, verbose: bool) -> Result<Self> {
        let mut ctx = GlobalContext::new()?;
        ctx.set_verbose(verbose);

        let manifest_path = match args.manifest_path {
            Some(ref path) => ctx.cwd().join(path),
            None => ctx.find_manifest()?,
        };
        let manifest = Manifest::load(&manifest_path)?;
        let config = ctx.load_config(manifest.root())?;

        if let Some(store) = args.store.clone().or_else(|| config.paths.store.clone()) {
            let store = ctx.cwd().join(store);
            ctx = ctx.with_store_dir(store);
        }

        let settings = ops::effective_settings(&manifest, &config, &args.settings)?;

        Ok(Project {
            ctx,
            manifest,
            config,
            settings,
            index_override: args.index.clone(),
        })
    }

    /// The package index: `--index`, then `[paths] index`, then `~/.anvil/index`.
    pub fn index(&self) -> Result<DirectoryIndex> {
        let dir = self
            .index_override
            .clone()
            .or_else(|| self.config.paths.index.clone())
            .map(|dir| self.ctx.cwd().join(dir))
            .unwrap_or_else(|| self.ctx.default_index_dir());

        if !dir.is_dir() && !self.manifest.requirements().is_empty() {
            bail!(
                "package index `{}` does not exist\n\
                 help: pass `--index <DIR>` or set [paths] index in .anvil/config.toml",
                dir.display()
            );
        }
        tracing::debug!("using package index {}", dir.display());
        Ok(DirectoryIndex::new(dir))
    }
}
