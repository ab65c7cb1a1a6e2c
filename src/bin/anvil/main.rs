//! Anvil CLI - dependency resolution and CMake builds for C/C++

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        match e.chain().find_map(|cause| cause.downcast_ref::<anvil::Error>()) {
            Some(err) => eprint!("{}", err.to_diagnostic().format(false)),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("anvil=debug")
    } else {
        EnvFilter::new("anvil=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        Commands::Resolve(args) => commands::resolve::execute(args, cli.verbose),
        Commands::Generate(args) => commands::generate::execute(args, cli.verbose),
        Commands::Build(args) => commands::build::execute(args, cli.verbose),
        Commands::Layout(args) => commands::layout::execute(args, cli.verbose),
    }
}
