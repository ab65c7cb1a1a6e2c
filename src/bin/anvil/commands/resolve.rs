//! `anvil resolve` command

use anyhow::Result;

use crate::cli::ResolveArgs;
use crate::commands::Project;
use anvil::generator::deps::render_graph_json;
use anvil::ops;

pub fn execute(args: ResolveArgs, verbose: bool) -> Result<()> {
    let project = Project::load(&args.project, verbose)?;
    let index = project.index()?;

    let graph = ops::resolve(&project.manifest, &project.settings, &index)?;

    if args.json {
        print!("{}", render_graph_json(&graph)?);
        return Ok(());
    }

    if graph.is_empty() {
        println!("{} has no dependencies", project.manifest.name());
        return Ok(());
    }

    for node in graph.nodes() {
        if node.dependencies.is_empty() {
            println!("{} {}", node.name, node.version);
        } else {
            println!(
                "{} {} -> {}",
                node.name,
                node.version,
                node.dependencies.join(", ")
            );
        }
    }

    Ok(())
}
