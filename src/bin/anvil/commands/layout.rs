//! `anvil layout` command

use anyhow::Result;

use crate::cli::LayoutArgs;
use crate::commands::Project;
use anvil::Layout;

pub fn execute(args: LayoutArgs, verbose: bool) -> Result<()> {
    let project = Project::load(&args.project, verbose)?;
    let layout = Layout::plan(&project.settings, project.manifest.root());

    println!("settings: {}", project.settings);
    println!("build_dir: {}", layout.build_dir().display());
    println!("generator_dir: {}", layout.generator_dir().display());

    Ok(())
}
