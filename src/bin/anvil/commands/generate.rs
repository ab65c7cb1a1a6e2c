//! `anvil generate` command

use anyhow::Result;

use crate::cli::GenerateArgs;
use crate::commands::Project;
use anvil::ops;

pub fn execute(args: GenerateArgs, verbose: bool) -> Result<()> {
    let mut project = Project::load(&args.project, verbose)?;
    if args.export_compile_commands {
        project.manifest.generate_mut().export_compile_commands = true;
    }
    let index = project.index()?;

    let (layout, descriptor) =
        ops::generate(&project.ctx, &project.manifest, &project.settings, &index)?;

    println!(
        "Generated {} files in {}",
        descriptor.files().len(),
        layout.generator_dir().display()
    );
    println!("fingerprint: {}", descriptor.fingerprint());

    Ok(())
}
