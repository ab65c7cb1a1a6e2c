//! Directory-backed package index.
//!
//! ```text
//! index/
//! ├── gtest.toml
//! └── zlib.toml
//! ```
//!
//! Each file lists the available versions of one package:
//!
//! ```toml
//! [[version]]
//! version = "1.15.0"
//! requires = ["zlib>=1.2"]
//! include_dirs = ["include"]
//! lib_dirs = ["lib"]
//! libs = ["gtest", "gtest_main"]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::requirement::validate_package_name;
use crate::core::Requirement;
use crate::resolver::version::{parse_version_lenient, Constraint};
use crate::sources::memory::select_highest;
use crate::sources::{IndexEntry, IndexError, PackageIndex, PackageInfo};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IndexFile {
    #[serde(default, rename = "version")]
    versions: Vec<IndexFileVersion>,
}

#[derive(Debug, Deserialize)]
struct IndexFileVersion {
    version: String,
    #[serde(default)]
    requires: Vec<String>,
    #[serde(flatten)]
    info: PackageInfo,
}

/// An index reading one TOML file per package from a directory.
#[derive(Debug, Clone)]
pub struct DirectoryIndex {
    root: PathBuf,
}

impl DirectoryIndex {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryIndex { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the index file for `name`.
    pub fn entry_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.toml", name))
    }

    fn load(&self, name: &str) -> Result<Vec<IndexEntry>, IndexError> {
        let unknown = || IndexError::UnknownPackage {
            name: name.to_string(),
        };

        // Names become file names; refuse anything that is not a package name.
        validate_package_name(name).map_err(|_| unknown())?;

        let path = self.entry_path(name);
        if !path.is_file() {
            return Err(unknown());
        }

        let invalid = |message: String| IndexError::Invalid {
            path: path.clone(),
            message,
        };

        let content = std::fs::read_to_string(&path).map_err(|e| invalid(e.to_string()))?;
        let file: IndexFile = toml::from_str(&content).map_err(|e| invalid(e.to_string()))?;

        file.versions
            .into_iter()
            .map(|raw| {
                let version = parse_version_lenient(&raw.version)
                    .ok_or_else(|| invalid(format!("invalid version `{}`", raw.version)))?;
                let requirements = raw
                    .requires
                    .iter()
                    .map(|r| r.parse::<Requirement>().map_err(|e| invalid(e.to_string())))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(IndexEntry {
                    version,
                    requirements,
                    info: raw.info,
                })
            })
            .collect()
    }
}

impl PackageIndex for DirectoryIndex {
    fn lookup(&self, name: &str, constraint: &Constraint) -> Result<IndexEntry, IndexError> {
        let entries = self.load(name)?;
        tracing::trace!("{} versions of `{}` in {}", entries.len(), name, self.root.display());
        select_highest(name, constraint, entries.iter())
    }
}
