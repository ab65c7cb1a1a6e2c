//! In-memory package index.

use std::collections::BTreeMap;

use semver::Version;

use crate::core::Requirement;
use crate::resolver::version::Constraint;
use crate::sources::{IndexEntry, IndexError, PackageIndex, PackageInfo};

/// An index held entirely in memory.
///
/// Useful for embedding and for tests; versions are kept sorted so lookups
/// are deterministic regardless of insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    packages: BTreeMap<String, BTreeMap<Version, IndexEntry>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a version. Re-registering a version replaces it.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        version: Version,
        requirements: Vec<Requirement>,
        info: PackageInfo,
    ) {
        let entry = IndexEntry {
            version: version.clone(),
            requirements,
            info,
        };
        self.packages
            .entry(name.into())
            .or_default()
            .insert(version, entry);
    }

    /// Number of distinct packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl PackageIndex for MemoryIndex {
    fn lookup(&self, name: &str, constraint: &Constraint) -> Result<IndexEntry, IndexError> {
        let versions = self
            .packages
            .get(name)
            .ok_or_else(|| IndexError::UnknownPackage {
                name: name.to_string(),
            })?;

        select_highest(name, constraint, versions.values())
    }
}

/// Pick the highest entry admitted by `constraint`.
pub(crate) fn select_highest<'a>(
    name: &str,
    constraint: &Constraint,
    entries: impl Iterator<Item = &'a IndexEntry>,
) -> Result<IndexEntry, IndexError> {
    let entries: Vec<&IndexEntry> = entries.collect();

    entries
        .iter()
        .filter(|e| constraint.contains(&e.version))
        .max_by(|a, b| a.version.cmp(&b.version))
        .map(|e| (*e).clone())
        .ok_or_else(|| {
            let mut available: Vec<&Version> = entries.iter().map(|e| &e.version).collect();
            available.sort();
            IndexError::NoMatchingVersion {
                name: name.to_string(),
                constraint: constraint.to_string(),
                available: available.iter().map(|v| v.to_string()).collect(),
            }
        })
}
