//! ResolvedGraph - the immutable dependency graph.
//!
//! The graph owns every node. Edges point from a package to the packages it
//! requires; the reverse direction is a separate name index rather than a
//! back-pointer, so ownership stays one-way.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use semver::Version;
use serde::Serialize;

use crate::core::Settings;
use crate::sources::PackageInfo;

/// One resolved package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedNode {
    pub name: String,
    pub version: Version,
    /// Settings the package was resolved for.
    pub settings: Settings,
    /// Names of the packages this one requires, sorted.
    pub dependencies: Vec<String>,
}

/// The conflict-free, acyclic result of resolution. Read-only once built.
#[derive(Debug, Clone)]
pub struct ResolvedGraph {
    graph: DiGraph<ResolvedNode, ()>,
    by_name: BTreeMap<String, NodeIndex>,
    dependents: BTreeMap<String, BTreeSet<String>>,
    package_info: BTreeMap<String, PackageInfo>,
    roots: Vec<String>,
    settings: Settings,
}

impl ResolvedGraph {
    /// Assemble a graph. Nodes are inserted in name order so that node
    /// indices, and everything derived from them, are reproducible.
    pub(crate) fn new(
        settings: Settings,
        roots: Vec<String>,
        packages: BTreeMap<String, (Version, Vec<String>, PackageInfo)>,
    ) -> Self {
        let mut graph = DiGraph::new();
        let mut by_name = BTreeMap::new();
        let mut package_info = BTreeMap::new();

        for (name, (version, deps, info)) in &packages {
            let node = graph.add_node(ResolvedNode {
                name: name.clone(),
                version: version.clone(),
                settings: settings.clone(),
                dependencies: deps.clone(),
            });
            by_name.insert(name.clone(), node);
            package_info.insert(name.clone(), info.clone());
        }

        let mut dependents: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (name, (_, deps, _)) in &packages {
            let from = by_name[name];
            for dep in deps {
                if let Some(&to) = by_name.get(dep) {
                    if !graph.contains_edge(from, to) {
                        graph.add_edge(from, to, ());
                    }
                    dependents.entry(dep.clone()).or_default().insert(name.clone());
                }
            }
        }

        ResolvedGraph {
            graph,
            by_name,
            dependents,
            package_info,
            roots,
            settings,
        }
    }

    /// Settings the graph was resolved for.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Directly required package names, in declaration order.
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Number of resolved packages.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Look up a node by package name.
    pub fn node(&self, name: &str) -> Option<&ResolvedNode> {
        self.by_name.get(name).map(|&idx| &self.graph[idx])
    }

    /// All nodes, ordered by name.
    pub fn nodes(&self) -> impl Iterator<Item = &ResolvedNode> {
        self.by_name.values().map(move |&idx| &self.graph[idx])
    }

    /// Consumer information for a package.
    pub fn package_info(&self, name: &str) -> Option<&PackageInfo> {
        self.package_info.get(name)
    }

    /// Direct dependencies of a package, ordered by name.
    pub fn deps(&self, name: &str) -> Vec<&ResolvedNode> {
        let mut deps: Vec<&ResolvedNode> = match self.by_name.get(name) {
            Some(&idx) => self
                .graph
                .neighbors_directed(idx, Direction::Outgoing)
                .map(|n| &self.graph[n])
                .collect(),
            None => Vec::new(),
        };
        deps.sort_by(|a, b| a.name.cmp(&b.name));
        deps
    }

    /// Names of the packages that require `name`, sorted.
    pub fn dependents(&self, name: &str) -> Vec<&str> {
        self.dependents
            .get(name)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Every package `name` depends on, directly or not.
    pub fn transitive_deps(&self, name: &str) -> BTreeSet<&str> {
        let mut visited = BTreeSet::new();
        let mut stack: Vec<&str> = self.deps(name).iter().map(|n| n.name.as_str()).collect();

        while let Some(current) = stack.pop() {
            if visited.insert(current) {
                stack.extend(self.deps(current).iter().map(|n| n.name.as_str()));
            }
        }
        visited
    }

    /// Nodes with dependencies before dependents; ties broken by name.
    pub fn topological_order(&self) -> Vec<&ResolvedNode> {
        let mut remaining: BTreeMap<&str, usize> = self
            .nodes()
            .map(|n| (n.name.as_str(), self.deps(&n.name).len()))
            .collect();

        let mut ready: BTreeSet<&str> = remaining
            .iter()
            .filter(|(_, &count)| count == 0)
            .map(|(&name, _)| name)
            .collect();

        let mut order = Vec::with_capacity(self.len());
        while let Some(name) = ready.pop_first() {
            remaining.remove(name);
            if let Some(node) = self.node(name) {
                order.push(node);
            }
            for dependent in self.dependents(name) {
                if let Some(count) = remaining.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(dependent);
                    }
                }
            }
        }
        order
    }
}
