//! The package-index contract.

use std::path::PathBuf;

use semver::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::Requirement;
use crate::resolver::version::Constraint;

/// A source of package versions and their requirements.
pub trait PackageIndex {
    /// Select the version of `name` to use under `constraint`.
    ///
    /// Implementations pick the highest version the constraint admits and
    /// must return the same answer for the same inputs.
    fn lookup(&self, name: &str, constraint: &Constraint) -> Result<IndexEntry, IndexError>;
}

impl<T: PackageIndex + ?Sized> PackageIndex for &T {
    fn lookup(&self, name: &str, constraint: &Constraint) -> Result<IndexEntry, IndexError> {
        (**self).lookup(name, constraint)
    }
}

/// One answer from the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub version: Version,

    /// Requirements of this version, in declaration order.
    pub requirements: Vec<Requirement>,

    /// What consumers need to compile and link against the package.
    pub info: PackageInfo,
}

/// Consumer-facing layout of a binary package, relative to its package folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageInfo {
    pub include_dirs: Vec<String>,
    pub lib_dirs: Vec<String>,
    /// Library names in link order.
    pub libs: Vec<String>,
}

impl Default for PackageInfo {
    fn default() -> Self {
        PackageInfo {
            include_dirs: vec!["include".to_string()],
            lib_dirs: vec!["lib".to_string()],
            libs: Vec::new(),
        }
    }
}

impl PackageInfo {
    /// Default directories with the given libraries.
    pub fn with_libs<I, S>(libs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PackageInfo {
            libs: libs.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

/// Errors an index can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("package `{name}` is not in the index")]
    UnknownPackage { name: String },

    #[error("no version of `{name}` matches `{constraint}`")]
    NoMatchingVersion {
        name: String,
        constraint: String,
        available: Vec<String>,
    },

    #[error("invalid index entry {}: {message}", .path.display())]
    Invalid { path: PathBuf, message: String },
}
