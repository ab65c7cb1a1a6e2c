//! Implementation of `anvil generate`.

use crate::core::{Layout, Manifest, Settings};
use crate::generator::{Descriptor, Generator};
use crate::ops::resolve;
use crate::sources::PackageIndex;
use crate::util::GlobalContext;
use crate::Error;

/// Resolve, plan the layout and write descriptors.
///
/// Nothing is written unless resolution succeeds.
pub fn generate<I: PackageIndex>(
    ctx: &GlobalContext,
    manifest: &Manifest,
    settings: &Settings,
    index: I,
) -> Result<(Layout, Descriptor), Error> {
    let graph = resolve(manifest, settings, index)?;
    let layout = Layout::plan(settings, manifest.root());

    let descriptor = Generator::new(manifest.generate().clone()).generate(
        &graph,
        &layout,
        settings,
        &ctx.store_dir(),
    )?;
    Ok((layout, descriptor))
}
