//! The build/package pipeline.
//!
//! A pipeline drives one build through its stages in a fixed order:
//!
//! ```text
//! Generated -> Configured -> Built -> Installed -> Packaged
//! ```
//!
//! Any stage failure moves the pipeline to `Failed(stage)` and no later stage
//! runs. Calling a stage out of order is rejected without running the tool.

pub mod cmake;
pub mod errors;
pub mod export;
pub mod tool;

pub use cmake::CMakeTool;
pub use errors::PipelineError;
pub use export::{ExportedComponent, PackageExport, EXPORT_FILE};
pub use tool::{BuildTool, Invocation, ToolOutput};

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{Component, Layout, Settings};
use crate::generator::Descriptor;
use crate::util::fs::{contains_files, to_cmake_path, write_atomic};

/// A pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Configure,
    Build,
    Install,
    Package,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Configure => "configure",
            Stage::Build => "build",
            Stage::Install => "install",
            Stage::Package => "package",
        })
    }
}

/// Where a pipeline is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Generated,
    Configured,
    Built,
    Installed,
    Packaged,
    Failed(Stage),
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Generated => f.write_str("generated"),
            PipelineState::Configured => f.write_str("configured"),
            PipelineState::Built => f.write_str("built"),
            PipelineState::Installed => f.write_str("installed"),
            PipelineState::Packaged => f.write_str("packaged"),
            PipelineState::Failed(stage) => write!(f, "failed({})", stage),
        }
    }
}

impl Stage {
    /// State a pipeline must be in before this stage runs.
    fn requires(self) -> PipelineState {
        match self {
            Stage::Configure => PipelineState::Generated,
            Stage::Build => PipelineState::Configured,
            Stage::Install => PipelineState::Built,
            Stage::Package => PipelineState::Installed,
        }
    }

    /// State a pipeline is in after this stage succeeds.
    fn produces(self) -> PipelineState {
        match self {
            Stage::Configure => PipelineState::Configured,
            Stage::Build => PipelineState::Built,
            Stage::Install => PipelineState::Installed,
            Stage::Package => PipelineState::Packaged,
        }
    }
}

/// Options for [`Pipeline::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Run install and package after build.
    pub package: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions { package: true }
    }
}

/// One build, driven stage by stage through a [`BuildTool`].
pub struct Pipeline<T> {
    tool: T,
    layout: Layout,
    settings: Settings,
    source_dir: PathBuf,
    jobs: Option<usize>,
    toolchain_file: Option<PathBuf>,
    state: PipelineState,
}

impl<T: BuildTool> Pipeline<T> {
    /// A pipeline for descriptors already generated into `layout`.
    ///
    /// The source directory defaults to the layout root.
    pub fn new(tool: T, layout: Layout, settings: Settings) -> Self {
        Pipeline {
            tool,
            source_dir: layout.root().to_path_buf(),
            layout,
            settings,
            jobs: None,
            toolchain_file: None,
            state: PipelineState::Generated,
        }
    }

    pub fn with_source_dir(mut self, source_dir: impl Into<PathBuf>) -> Self {
        self.source_dir = source_dir.into();
        self
    }

    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Configure the native build against the generated toolchain.
    pub fn configure(&mut self, descriptor: &Descriptor) -> Result<(), PipelineError> {
        self.enter(Stage::Configure)?;
        let result = self.do_configure(descriptor);
        self.leave(Stage::Configure, result)
    }

    /// Compile.
    pub fn build(&mut self) -> Result<(), PipelineError> {
        self.enter(Stage::Build)?;
        let result = self.do_build();
        self.leave(Stage::Build, result)
    }

    /// Install build outputs under `package_root`.
    pub fn install(&mut self, package_root: &Path) -> Result<(), PipelineError> {
        self.enter(Stage::Install)?;
        let result = self.do_install(package_root);
        self.leave(Stage::Install, result)
    }

    /// Check every component's libraries and write the export metadata.
    pub fn package(
        &mut self,
        package_root: &Path,
        components: &[Component],
    ) -> Result<PackageExport, PipelineError> {
        self.enter(Stage::Package)?;
        let result = self.do_package(package_root, components);
        self.leave(Stage::Package, result)
    }

    /// Run every stage in order.
    ///
    /// Returns the export when packaging is enabled; the pipeline stops at
    /// `Built` otherwise.
    pub fn run(
        &mut self,
        descriptor: &Descriptor,
        package_root: &Path,
        components: &[Component],
        options: PipelineOptions,
    ) -> Result<Option<PackageExport>, PipelineError> {
        self.configure(descriptor)?;
        self.build()?;
        if !options.package {
            tracing::info!("packaging disabled; stopping after build");
            return Ok(None);
        }
        self.install(package_root)?;
        self.package(package_root, components).map(Some)
    }

    fn enter(&self, stage: Stage) -> Result<(), PipelineError> {
        if self.state != stage.requires() {
            return Err(PipelineError::InvalidTransition {
                stage,
                state: self.state,
            });
        }
        tracing::debug!("entering {} stage", stage);
        Ok(())
    }

    fn leave<R>(&mut self, stage: Stage, result: Result<R, PipelineError>) -> Result<R, PipelineError> {
        match result {
            Ok(value) => {
                self.state = stage.produces();
                tracing::info!("{} stage finished", stage);
                Ok(value)
            }
            Err(err) => {
                self.state = PipelineState::Failed(stage);
                tracing::error!("{} stage failed: {}", stage, err);
                Err(err)
            }
        }
    }

    fn invocation(&self, step: Stage, package_root: Option<&Path>) -> Invocation {
        Invocation {
            step,
            source_dir: self.source_dir.clone(),
            build_dir: self.layout.build_dir().to_path_buf(),
            generator_dir: self.layout.generator_dir().to_path_buf(),
            toolchain_file: self
                .toolchain_file
                .clone()
                .unwrap_or_else(|| self.layout.generator_dir().join(crate::generator::TOOLCHAIN_CMAKE)),
            settings: self.settings.clone(),
            package_root: package_root.map(Path::to_path_buf),
            jobs: self.jobs,
        }
    }

    fn run_tool(&self, step: Stage, package_root: Option<&Path>) -> Result<ToolOutput, PipelineError> {
        let invocation = self.invocation(step, package_root);
        self.tool
            .run(&invocation)
            .map_err(|source| PipelineError::Spawn { stage: step, source })
    }

    fn do_configure(&mut self, descriptor: &Descriptor) -> Result<(), PipelineError> {
        let toolchain = descriptor.toolchain_file();
        if !toolchain.is_file() {
            return Err(PipelineError::ConfigureSetup {
                message: format!("toolchain file `{}` does not exist", toolchain.display()),
            });
        }
        self.toolchain_file = Some(toolchain);

        let build_dir = self.layout.build_dir();
        fs::create_dir_all(build_dir).map_err(|source| PipelineError::Io {
            stage: Stage::Configure,
            path: build_dir.to_path_buf(),
            source,
        })?;

        let output = self.run_tool(Stage::Configure, None)?;
        if !output.is_success() {
            return Err(PipelineError::Configure {
                status: output.status,
                output: output.diagnostics(),
            });
        }
        Ok(())
    }

    fn do_build(&self) -> Result<(), PipelineError> {
        let output = self.run_tool(Stage::Build, None)?;
        if !output.is_success() {
            return Err(PipelineError::Build {
                status: output.status,
                interrupted: output.status.is_none(),
                output: output.diagnostics(),
            });
        }
        Ok(())
    }

    fn do_install(&self, package_root: &Path) -> Result<(), PipelineError> {
        if !self.layout.build_dir().is_dir() {
            return Err(PipelineError::Install {
                message: format!(
                    "build directory `{}` does not exist",
                    self.layout.build_dir().display()
                ),
                output: String::new(),
            });
        }

        // Start from an empty package root so nothing from an earlier
        // install can satisfy the checks below.
        if package_root.exists() {
            tracing::debug!("clearing previous package at {}", package_root.display());
            fs::remove_dir_all(package_root).map_err(|source| PipelineError::Io {
                stage: Stage::Install,
                path: package_root.to_path_buf(),
                source,
            })?;
        }

        let output = self.run_tool(Stage::Install, Some(package_root))?;
        if !output.is_success() {
            return Err(PipelineError::Install {
                message: format!("install step exited with {}", errors::ExitStatus(&output.status)),
                output: output.diagnostics(),
            });
        }

        if !contains_files(package_root) {
            return Err(PipelineError::Install {
                message: format!("nothing was installed into `{}`", package_root.display()),
                output: output.diagnostics(),
            });
        }
        Ok(())
    }

    fn do_package(
        &self,
        package_root: &Path,
        components: &[Component],
    ) -> Result<PackageExport, PipelineError> {
        let mut exported = Vec::with_capacity(components.len());

        for component in components {
            let mut files = Vec::with_capacity(component.libs.len());
            for lib in &component.libs {
                match export::locate_library(package_root, lib, &self.settings) {
                    Ok(file) => files.push(file),
                    Err(expected) => {
                        return Err(PipelineError::MissingArtifact {
                            component: component.name.clone(),
                            file: package_root.join(expected),
                        })
                    }
                }
            }
            exported.push(ExportedComponent {
                name: component.name.clone(),
                target: component.exported_target_name.clone(),
                libs: component.libs.clone(),
                files,
            });
        }

        let export = PackageExport::new(self.settings.clone(), exported);
        let path = package_root.join(EXPORT_FILE);
        let io_err = |source: std::io::Error| PipelineError::Io {
            stage: Stage::Package,
            path: path.clone(),
            source,
        };
        let json = export.to_json().map_err(|e| io_err(e.into()))?;
        write_atomic(&path, json.as_bytes()).map_err(io_err)?;

        tracing::info!(
            "packaged {} component(s) into {}",
            export.components.len(),
            to_cmake_path(package_root)
        );
        Ok(export)
    }
}
