//! `anvil build` command

use anyhow::{Context, Result};

use crate::cli::BuildArgs;
use crate::commands::Project;
use anvil::ops::{self, BuildOptions};
use anvil::pipeline::CMakeTool;

pub fn execute(args: BuildArgs, verbose: bool) -> Result<()> {
    let mut project = Project::load(&args.project, verbose)?;
    if args.export_compile_commands {
        project.manifest.generate_mut().export_compile_commands = true;
    }
    let index = project.index()?;

    let tool = match args.cmake {
        Some(ref cmake) => CMakeTool::new(cmake),
        None => CMakeTool::locate().context("cannot build without CMake")?,
    };

    let opts = BuildOptions {
        package: if args.no_package { Some(false) } else { None },
        jobs: args.jobs,
        config_jobs: project.config.build.jobs,
    };

    let outcome = ops::build(
        &project.ctx,
        &project.manifest,
        &project.settings,
        &index,
        tool,
        &opts,
    )?;

    println!(
        "Finished {} ({}) in state `{}`",
        project.manifest.name(),
        project.settings.build_type(),
        outcome.state
    );
    if let Some(export) = outcome.export {
        for component in &export.components {
            println!(
                "  {} -> {} [{}]",
                component.name,
                component.target,
                component.files.join(", ")
            );
        }
    }

    Ok(())
}
