//! CMake as the production build tool.

use std::io;
use std::path::PathBuf;

use crate::pipeline::tool::{BuildTool, Invocation, ToolOutput};
use crate::pipeline::Stage;
use crate::util::fs::to_cmake_path;
use crate::util::process::{find_cmake, ProcessBuilder};

/// Runs `cmake` for the configure, build and install stages.
#[derive(Debug, Clone)]
pub struct CMakeTool {
    cmake: PathBuf,
    configure_args: Vec<String>,
}

impl CMakeTool {
    /// Use a specific cmake executable.
    pub fn new(cmake: impl Into<PathBuf>) -> Self {
        CMakeTool {
            cmake: cmake.into(),
            configure_args: Vec::new(),
        }
    }

    /// Locate cmake on `PATH` (or through the `CMAKE` variable).
    pub fn locate() -> io::Result<Self> {
        find_cmake().map(CMakeTool::new).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "cmake not found; install CMake and ensure it is in PATH",
            )
        })
    }

    /// Extra arguments for the configure step.
    pub fn configure_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.configure_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The command line for one stage.
    pub fn command(&self, inv: &Invocation) -> ProcessBuilder {
        let cmd = ProcessBuilder::new(&self.cmake);
        let build_type = inv.settings.build_type();

        match inv.step {
            Stage::Configure => cmd
                .arg("-S")
                .arg(&inv.source_dir)
                .arg("-B")
                .arg(&inv.build_dir)
                .arg(format!(
                    "-DCMAKE_TOOLCHAIN_FILE={}",
                    to_cmake_path(&inv.toolchain_file)
                ))
                .arg(format!("-DCMAKE_BUILD_TYPE={}", build_type))
                .args(&self.configure_args),
            Stage::Build => {
                // --config covers multi-config generators like Visual Studio.
                let cmd = cmd
                    .arg("--build")
                    .arg(&inv.build_dir)
                    .arg("--config")
                    .arg(build_type)
                    .arg("--parallel");
                match inv.jobs {
                    Some(jobs) => cmd.arg(jobs.to_string()),
                    None => cmd,
                }
            }
            Stage::Install | Stage::Package => {
                let cmd = cmd
                    .arg("--install")
                    .arg(&inv.build_dir)
                    .arg("--config")
                    .arg(build_type);
                match inv.package_root {
                    Some(ref root) => cmd.arg("--prefix").arg(root),
                    None => cmd,
                }
            }
        }
    }
}

impl BuildTool for CMakeTool {
    fn run(&self, invocation: &Invocation) -> io::Result<ToolOutput> {
        tracing::info!("running cmake {} stage", invocation.step);
        let output = self.command(invocation).exec()?;
        Ok(ToolOutput::from(output))
    }
}
