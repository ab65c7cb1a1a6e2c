//! Implementation of `anvil resolve`.

use crate::core::{Manifest, Settings};
use crate::resolver::{ResolvedGraph, Resolver};
use crate::sources::PackageIndex;
use crate::Error;

/// Resolve the recipe's requirements for `settings`.
pub fn resolve<I: PackageIndex>(
    manifest: &Manifest,
    settings: &Settings,
    index: I,
) -> Result<ResolvedGraph, Error> {
    tracing::info!(
        "resolving {} requirement(s) of `{}` for {}",
        manifest.requirements().len(),
        manifest.name(),
        settings
    );

    let graph = Resolver::new(index)
        .with_root_name(manifest.name())
        .resolve(manifest.requirements(), settings)?;
    Ok(graph)
}
