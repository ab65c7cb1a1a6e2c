//! The build-tool seam.

use std::io;
use std::path::PathBuf;
use std::process::Output;

use crate::core::Settings;
use crate::pipeline::Stage;

/// Everything a build tool needs to run one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub step: Stage,
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub generator_dir: PathBuf,
    pub toolchain_file: PathBuf,
    pub settings: Settings,
    /// Install prefix; set for the install step only.
    pub package_root: Option<PathBuf>,
    pub jobs: Option<usize>,
}

/// Result of running a tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, or `None` if the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success() -> Self {
        ToolOutput {
            status: Some(0),
            ..Default::default()
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        ToolOutput {
            status: Some(code),
            stderr: stderr.into(),
            ..Default::default()
        }
    }

    pub fn interrupted() -> Self {
        ToolOutput::default()
    }

    pub fn is_success(&self) -> bool {
        self.status == Some(0)
    }

    /// Combined diagnostics, stderr first.
    pub fn diagnostics(&self) -> String {
        let mut out = self.stderr.trim_end().to_string();
        let stdout = self.stdout.trim_end();
        if !stdout.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(stdout);
        }
        out
    }
}

impl From<Output> for ToolOutput {
    fn from(output: Output) -> Self {
        ToolOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// An external build system driven by the pipeline.
///
/// `run` blocks until the tool exits. An `Err` means the tool could not be
/// started at all; a started tool that fails reports it through
/// [`ToolOutput::status`].
pub trait BuildTool {
    fn run(&self, invocation: &Invocation) -> io::Result<ToolOutput>;
}

impl<T: BuildTool + ?Sized> BuildTool for &T {
    fn run(&self, invocation: &Invocation) -> io::Result<ToolOutput> {
        (**self).run(invocation)
    }
}

impl<T: BuildTool + ?Sized> BuildTool for Box<T> {
    fn run(&self, invocation: &Invocation) -> io::Result<ToolOutput> {
        (**self).run(invocation)
    }
}
