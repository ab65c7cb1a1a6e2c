//! Per-package dependency descriptors and the graph snapshot.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::{package_dir, Settings};
use crate::generator::FORMAT_VERSION;
use crate::resolver::{ResolvedGraph, ResolvedNode};
use crate::util::fs::to_cmake_path;

/// Absolute include/lib directories and libraries of one resolved package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyPaths {
    pub package_folder: PathBuf,
    pub include_dirs: Vec<PathBuf>,
    pub lib_dirs: Vec<PathBuf>,
    pub libs: Vec<String>,
}

/// Locate every resolved package in the store.
pub fn dependency_paths(
    graph: &ResolvedGraph,
    store: &Path,
    settings: &Settings,
) -> BTreeMap<String, DependencyPaths> {
    let mut out = BTreeMap::new();
    for node in graph.nodes() {
        let folder = package_dir(store, &node.name, &node.version, settings);
        let info = graph.package_info(&node.name).cloned().unwrap_or_default();
        out.insert(
            node.name.clone(),
            DependencyPaths {
                include_dirs: info.include_dirs.iter().map(|d| folder.join(d)).collect(),
                lib_dirs: info.lib_dirs.iter().map(|d| folder.join(d)).collect(),
                libs: info.libs,
                package_folder: folder,
            },
        );
    }
    out
}

#[derive(Serialize)]
struct DepsFile<'a> {
    format_version: u32,
    name: &'a str,
    version: String,
    package_folder: String,
    include_dirs: Vec<String>,
    lib_dirs: Vec<String>,
    libs: &'a [String],
    dependencies: &'a [String],
}

/// `<pkg>-deps.json`
pub fn render_deps_json(
    node: &ResolvedNode,
    paths: &DependencyPaths,
) -> Result<String, serde_json::Error> {
    let file = DepsFile {
        format_version: FORMAT_VERSION,
        name: &node.name,
        version: node.version.to_string(),
        package_folder: to_cmake_path(&paths.package_folder),
        include_dirs: paths.include_dirs.iter().map(|p| to_cmake_path(p)).collect(),
        lib_dirs: paths.lib_dirs.iter().map(|p| to_cmake_path(p)).collect(),
        libs: &paths.libs,
        dependencies: &node.dependencies,
    };
    Ok(serde_json::to_string_pretty(&file)? + "\n")
}

fn cmake_list(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("\"{}\"", super::escape_cmake(&to_cmake_path(p))))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `<pkg>-config.cmake`, defining the `<pkg>::<pkg>` imported target.
pub fn render_config_cmake(node: &ResolvedNode, paths: &DependencyPaths) -> String {
    let name = &node.name;
    let target = format!("{0}::{0}", name);
    let mut out = String::new();

    out.push_str("# Generated by anvil. Do not edit.\n");
    out.push_str(&format!("# anvil-config format {}\n\n", FORMAT_VERSION));
    out.push_str("include_guard(GLOBAL)\n");
    out.push_str("include(CMakeFindDependencyMacro)\n\n");

    for dep in &node.dependencies {
        out.push_str(&format!("find_dependency({} CONFIG)\n", dep));
    }
    if !node.dependencies.is_empty() {
        out.push('\n');
    }

    out.push_str(&format!("set({}_VERSION \"{}\")\n", name, node.version));
    out.push_str(&format!(
        "set({}_INCLUDE_DIRS {})\n",
        name,
        cmake_list(&paths.include_dirs)
    ));
    out.push_str(&format!("set({}_LIB_DIRS {})\n", name, cmake_list(&paths.lib_dirs)));
    out.push_str(&format!("set({}_LIBS {})\n\n", name, paths.libs.join(" ")));

    out.push_str(&format!("if(NOT TARGET {})\n", target));
    out.push_str(&format!("    add_library({} INTERFACE IMPORTED)\n", target));
    out.push_str(&format!(
        "    set_property(TARGET {} PROPERTY INTERFACE_INCLUDE_DIRECTORIES ${{{}_INCLUDE_DIRS}})\n",
        target, name
    ));
    out.push_str(&format!(
        "    set_property(TARGET {} PROPERTY INTERFACE_LINK_DIRECTORIES ${{{}_LIB_DIRS}})\n",
        target, name
    ));
    let mut link: Vec<String> = paths.libs.clone();
    link.extend(node.dependencies.iter().map(|d| format!("{0}::{0}", d)));
    if !link.is_empty() {
        out.push_str(&format!(
            "    set_property(TARGET {} PROPERTY INTERFACE_LINK_LIBRARIES {})\n",
            target,
            link.join(" ")
        ));
    }
    out.push_str("endif()\n\n");
    out.push_str(&format!("set({}_FOUND TRUE)\n", name));
    out
}

#[derive(Serialize)]
struct GraphFile<'a> {
    format_version: u32,
    settings: &'a Settings,
    roots: &'a [String],
    packages: Vec<GraphPackage<'a>>,
}

#[derive(Serialize)]
struct GraphPackage<'a> {
    name: &'a str,
    version: String,
    dependencies: &'a [String],
}

/// `graph.json`: packages in name order.
pub fn render_graph_json(graph: &ResolvedGraph) -> Result<String, serde_json::Error> {
    let file = GraphFile {
        format_version: FORMAT_VERSION,
        settings: graph.settings(),
        roots: graph.roots(),
        packages: graph
            .nodes()
            .map(|n| GraphPackage {
                name: &n.name,
                version: n.version.to_string(),
                dependencies: &n.dependencies,
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&file)? + "\n")
}
