//! Dependency resolution.
//!
//! Requirements are expanded depth-first against a [`PackageIndex`]: root
//! requirements in declaration order, each package's own requirements in
//! alphabetical order. Every requirement on a package is intersected with the
//! ones seen before it; an empty intersection fails immediately.
//!
//! A requirement discovered late can exclude a version picked earlier, so
//! resolution runs in passes. Each pass queries the index with the
//! constraints the previous pass ended with; when a pass ends with exactly
//! the constraints it started from, every selected version satisfies every
//! requirement on it and the result is final. The resolver does no I/O of its
//! own, so identical inputs give identical graphs.

pub mod errors;
pub mod resolve;
pub mod version;

pub use errors::ResolveError;
pub use resolve::{ResolvedGraph, ResolvedNode};
pub use version::Constraint;

use std::collections::BTreeMap;

use semver::Version;

use crate::core::{Requirement, Settings};
use crate::sources::{IndexEntry, PackageIndex, PackageInfo};

/// Upper bound on resolution passes.
pub const MAX_PASSES: usize = 16;

/// Requirer name used for the recipe's own requirements.
pub const ROOT_REQUIRER: &str = "root";

/// Resolves requirements against a package index.
pub struct Resolver<I> {
    index: I,
    root_name: String,
}

impl<I: PackageIndex> Resolver<I> {
    pub fn new(index: I) -> Self {
        Resolver {
            index,
            root_name: ROOT_REQUIRER.to_string(),
        }
    }

    /// Name reported as the requirer of root requirements in errors.
    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = name.into();
        self
    }

    /// Resolve `requirements` for `settings`.
    pub fn resolve(
        &self,
        requirements: &[Requirement],
        settings: &Settings,
    ) -> Result<ResolvedGraph, ResolveError> {
        let mut hints: BTreeMap<String, Constraint> = BTreeMap::new();

        for pass in 1..=MAX_PASSES {
            let mut session = Session::new(&self.index, &hints);
            for req in requirements {
                session.visit(&self.root_name, req)?;
            }

            if session.constraints == hints {
                let graph = session.into_graph(requirements, settings);
                tracing::info!(
                    "resolved {} package(s) for {} in {} pass(es)",
                    graph.len(),
                    settings,
                    pass
                );
                return Ok(graph);
            }

            tracing::debug!("resolution pass {} refined constraints, retrying", pass);
            hints = session.constraints;
        }

        Err(ResolveError::Unsettled { passes: MAX_PASSES })
    }
}

/// State of a single resolution pass.
struct Session<'a, I> {
    index: &'a I,
    /// Constraints the previous pass ended with.
    hints: &'a BTreeMap<String, Constraint>,
    /// Constraints accumulated in this pass.
    constraints: BTreeMap<String, Constraint>,
    selected: BTreeMap<String, IndexEntry>,
    /// Current expansion path, for cycle detection.
    path: Vec<String>,
}

impl<'a, I: PackageIndex> Session<'a, I> {
    fn new(index: &'a I, hints: &'a BTreeMap<String, Constraint>) -> Self {
        Session {
            index,
            hints,
            constraints: BTreeMap::new(),
            selected: BTreeMap::new(),
            path: Vec::new(),
        }
    }

    fn visit(&mut self, requirer: &str, req: &Requirement) -> Result<(), ResolveError> {
        let name = req.name();

        if let Some(pos) = self.path.iter().position(|p| p == name) {
            let mut cycle = self.path[pos..].to_vec();
            cycle.push(name.to_string());
            return Err(ResolveError::CyclicDependency { cycle });
        }

        let incoming = Constraint::from_requirement(req, requirer);
        let merged = match self.constraints.get(name) {
            Some(existing) => existing.intersect(&incoming),
            None => incoming,
        };
        if merged.is_empty() {
            return Err(ResolveError::UnsatisfiableConstraint {
                package: name.to_string(),
                requirements: merged.sources().to_vec(),
            });
        }
        self.constraints.insert(name.to_string(), merged.clone());

        if self.selected.contains_key(name) {
            return Ok(());
        }

        let query = match self.hints.get(name) {
            Some(hint) => {
                let narrowed = hint.intersect(&merged);
                if narrowed.is_empty() {
                    merged
                } else {
                    narrowed
                }
            }
            None => merged,
        };

        let entry = self.index.lookup(name, &query)?;
        if !query.contains(&entry.version) {
            return Err(ResolveError::NoMatchingVersion {
                package: name.to_string(),
                requirement: query.to_string(),
                available: vec![entry.version.to_string()],
            });
        }
        tracing::debug!("selected {} v{} for `{}`", name, entry.version, query);

        let mut subs = entry.requirements.clone();
        subs.sort_by(|a, b| a.name().cmp(b.name()));
        self.selected.insert(name.to_string(), entry);

        self.path.push(name.to_string());
        for sub in &subs {
            self.visit(name, sub)?;
        }
        self.path.pop();

        Ok(())
    }

    fn into_graph(self, requirements: &[Requirement], settings: &Settings) -> ResolvedGraph {
        let mut roots: Vec<String> = Vec::new();
        for req in requirements {
            if !roots.iter().any(|r| r == req.name()) {
                roots.push(req.name().to_string());
            }
        }

        let packages: BTreeMap<String, (Version, Vec<String>, PackageInfo)> = self
            .selected
            .into_iter()
            .map(|(name, entry)| {
                let mut deps: Vec<String> = entry
                    .requirements
                    .iter()
                    .map(|r| r.name().to_string())
                    .collect();
                deps.sort();
                deps.dedup();
                (name, (entry.version, deps, entry.info))
            })
            .collect();

        ResolvedGraph::new(settings.clone(), roots, packages)
    }
}
