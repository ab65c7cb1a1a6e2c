//! Implementation of `anvil build`.

use crate::core::{package_dir, Layout, Manifest, Settings};
use crate::generator::Descriptor;
use crate::ops::generate;
use crate::pipeline::{BuildTool, PackageExport, Pipeline, PipelineOptions, PipelineState};
use crate::sources::PackageIndex;
use crate::util::GlobalContext;
use crate::Error;

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Override the recipe's `[build] package`
    pub package: Option<bool>,

    /// Number of parallel jobs; overrides the recipe's `[build] jobs`
    pub jobs: Option<usize>,

    /// `[build] jobs` from config files, used when neither the command line
    /// nor the recipe sets one
    pub config_jobs: Option<usize>,
}

/// Result of a completed build.
#[derive(Debug)]
pub struct BuildOutcome {
    pub state: PipelineState,
    pub layout: Layout,
    pub descriptor: Descriptor,
    /// Set when packaging ran.
    pub export: Option<PackageExport>,
}

/// Generate descriptors, then drive the pipeline with `tool`.
///
/// The package is installed into the store folder for the recipe's own
/// `(name, version, settings)`, so later builds can consume it.
pub fn build<I: PackageIndex, T: BuildTool>(
    ctx: &GlobalContext,
    manifest: &Manifest,
    settings: &Settings,
    index: I,
    tool: T,
    opts: &BuildOptions,
) -> Result<BuildOutcome, Error> {
    let (layout, descriptor) = generate(ctx, manifest, settings, index)?;

    let package = opts.package.unwrap_or(manifest.build().package);
    let jobs = opts.jobs.or(manifest.build().jobs).or(opts.config_jobs);
    let package_root = package_dir(&ctx.store_dir(), manifest.name(), manifest.version(), settings);

    let mut pipeline = Pipeline::new(tool, layout.clone(), settings.clone())
        .with_source_dir(manifest.source_dir())
        .with_jobs(jobs);

    let export = pipeline.run(
        &descriptor,
        &package_root,
        manifest.components(),
        PipelineOptions { package },
    )?;

    Ok(BuildOutcome {
        state: pipeline.state(),
        layout,
        descriptor,
        export,
    })
}
