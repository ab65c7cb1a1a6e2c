//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Anvil - deterministic dependency resolution and CMake builds for C/C++
#[derive(Parser)]
#[command(name = "anvil")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the dependency graph and print it
    Resolve(ResolveArgs),

    /// Resolve and write toolchain and dependency descriptors
    Generate(GenerateArgs),

    /// Generate, then configure, build, install and package
    Build(BuildArgs),

    /// Print the build and generator directories for the current settings
    Layout(LayoutArgs),
}

/// Options shared by every command that reads a recipe.
#[derive(Args, Clone, Debug)]
pub struct ProjectArgs {
    /// Path to Anvil.toml
    #[arg(long, value_name = "PATH")]
    pub manifest_path: Option<PathBuf>,

    /// Override a setting (os, compiler, build_type, arch)
    #[arg(short = 's', long = "setting", value_name = "KEY=VALUE")]
    pub settings: Vec<String>,

    /// Package index directory
    #[arg(long, value_name = "DIR", env = "ANVIL_INDEX")]
    pub index: Option<PathBuf>,

    /// Binary package store
    #[arg(long, value_name = "DIR", env = "ANVIL_STORE")]
    pub store: Option<PathBuf>,
}

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Print the graph as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Emit compile_commands.json from the native build
    #[arg(long)]
    pub export_compile_commands: bool,
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Stop after the build stage
    #[arg(long)]
    pub no_package: bool,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// CMake executable to use
    #[arg(long, value_name = "PATH")]
    pub cmake: Option<PathBuf>,

    /// Emit compile_commands.json from the native build
    #[arg(long)]
    pub export_compile_commands: bool,
}

#[derive(Args)]
pub struct LayoutArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}
