//! Crate-wide error type.

use thiserror::Error;

use crate::core::SettingsError;
use crate::generator::GenerationError;
use crate::pipeline::{PipelineError, Stage};
use crate::resolver::ResolveError;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Any failure of a resolve, generate or build operation.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidSettings,
    UnsatisfiableConstraint,
    CyclicDependency,
    /// The package index was unreadable or lacks a package.
    PackageIndex,
    GenerationIo,
    Configure,
    Build,
    Install,
    MissingArtifact,
    /// A pipeline stage was called out of order.
    InvalidTransition,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Settings(_) => ErrorKind::InvalidSettings,
            Error::Resolve(err) => match err {
                ResolveError::UnsatisfiableConstraint { .. }
                | ResolveError::NoMatchingVersion { .. }
                | ResolveError::Unsettled { .. } => ErrorKind::UnsatisfiableConstraint,
                ResolveError::CyclicDependency { .. } => ErrorKind::CyclicDependency,
                ResolveError::PackageNotFound { .. } | ResolveError::Index { .. } => {
                    ErrorKind::PackageIndex
                }
            },
            Error::Generation(err) => match err {
                GenerationError::Io { .. } => ErrorKind::GenerationIo,
                GenerationError::SettingsMismatch { .. } => ErrorKind::InvalidSettings,
            },
            Error::Pipeline(err) => match err {
                PipelineError::MissingArtifact { .. } => ErrorKind::MissingArtifact,
                PipelineError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
                // The export file is a generated descriptor.
                PipelineError::Io {
                    stage: Stage::Package,
                    ..
                } => ErrorKind::GenerationIo,
                other => match other.stage() {
                    Some(Stage::Configure) => ErrorKind::Configure,
                    Some(Stage::Build) => ErrorKind::Build,
                    Some(Stage::Install) | Some(Stage::Package) | None => ErrorKind::Install,
                },
            },
        }
    }
}

impl Error {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Error::Resolve(err) => err.to_diagnostic(),
            Error::Settings(_) => {
                Diagnostic::error(self.to_string()).with_suggestion(suggestions::CHECK_SETTINGS)
            }
            Error::Pipeline(PipelineError::MissingArtifact { file, .. }) => {
                Diagnostic::error(self.to_string())
                    .with_location(file.clone())
                    .with_suggestion("Check the component's `libs` against what the install step produces")
            }
            Error::Pipeline(_) if matches!(self.kind(), ErrorKind::Configure | ErrorKind::Build) => {
                Diagnostic::error(self.to_string()).with_suggestion(suggestions::BUILD_FAILED)
            }
            _ => Diagnostic::error(self.to_string()),
        }
    }
}
