//! Pipeline errors.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::{PipelineState, Stage};

/// Render an exit status for messages.
pub(crate) struct ExitStatus<'a>(pub &'a Option<i32>);

impl fmt::Display for ExitStatus<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self.0 {
            Some(code) => write!(f, "exit code {}", code),
            None => f.write_str("no exit code"),
        }
    }
}

fn build_outcome(interrupted: &bool) -> &'static str {
    if *interrupted {
        "was interrupted"
    } else {
        "failed"
    }
}

fn with_output(output: &str) -> String {
    if output.is_empty() {
        String::new()
    } else {
        format!(":\n{}", output)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configure failed ({}){}", ExitStatus(.status), with_output(.output))]
    Configure { status: Option<i32>, output: String },

    #[error("configure failed: {message}")]
    ConfigureSetup { message: String },

    #[error(
        "build {} ({}){}",
        build_outcome(.interrupted),
        ExitStatus(.status),
        with_output(.output)
    )]
    Build {
        status: Option<i32>,
        interrupted: bool,
        output: String,
    },

    #[error("install failed: {message}{}", with_output(.output))]
    Install { message: String, output: String },

    #[error("component `{component}` is missing library `{}`", file.display())]
    MissingArtifact { component: String, file: PathBuf },

    #[error("failed to run the build tool for the {stage} stage: {source}")]
    Spawn {
        stage: Stage,
        #[source]
        source: io::Error,
    },

    #[error("failed to access `{}` during the {stage} stage: {source}", path.display())]
    Io {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot run the {stage} stage from state `{state}`")]
    InvalidTransition { stage: Stage, state: PipelineState },
}

impl PipelineError {
    /// The stage this error belongs to, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Configure { .. } | PipelineError::ConfigureSetup { .. } => {
                Some(Stage::Configure)
            }
            PipelineError::Build { .. } => Some(Stage::Build),
            PipelineError::Install { .. } => Some(Stage::Install),
            PipelineError::MissingArtifact { .. } => Some(Stage::Package),
            PipelineError::Spawn { stage, .. } | PipelineError::Io { stage, .. } => Some(*stage),
            PipelineError::InvalidTransition { .. } => None,
        }
    }
}
