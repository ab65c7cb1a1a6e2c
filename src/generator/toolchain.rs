//! Toolchain descriptor: a flat map of build-system variables.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::{Layout, Settings};
use crate::generator::{GeneratorOptions, VariableValue, FORMAT_VERSION};
use crate::resolver::ResolvedGraph;
use crate::util::fs::to_cmake_path;

/// Compiler executables `(C, C++)` for a compiler setting.
fn compiler_executables(compiler: &str) -> Option<(&'static str, &'static str)> {
    match compiler.to_ascii_lowercase().as_str() {
        "gcc" => Some(("gcc", "g++")),
        "clang" | "apple-clang" => Some(("clang", "clang++")),
        "msvc" => Some(("cl", "cl")),
        "intel-cc" => Some(("icx", "icpx")),
        _ => None,
    }
}

/// Compute the toolchain variables for a build.
pub fn toolchain_variables(
    graph: &ResolvedGraph,
    layout: &Layout,
    settings: &Settings,
    options: &GeneratorOptions,
) -> BTreeMap<String, VariableValue> {
    let generators = to_cmake_path(layout.generator_dir());
    let mut vars: BTreeMap<String, VariableValue> = BTreeMap::new();

    vars.insert("CMAKE_BUILD_TYPE".into(), settings.build_type().into());
    vars.insert("CMAKE_PREFIX_PATH".into(), generators.clone().into());
    vars.insert("CMAKE_MODULE_PATH".into(), generators.clone().into());
    // Packaging looks for libraries under `<prefix>/lib`.
    vars.insert("CMAKE_INSTALL_LIBDIR".into(), crate::pipeline::export::LIB_DIR.into());
    vars.insert("ANVIL_OS".into(), settings.os().into());
    vars.insert("ANVIL_ARCH".into(), settings.arch().into());
    vars.insert("ANVIL_COMPILER".into(), settings.compiler().into());

    if let Some((cc, cxx)) = compiler_executables(settings.compiler()) {
        vars.insert("CMAKE_C_COMPILER".into(), cc.into());
        vars.insert("CMAKE_CXX_COMPILER".into(), cxx.into());
    }

    if options.export_compile_commands {
        vars.insert("CMAKE_EXPORT_COMPILE_COMMANDS".into(), true.into());
    }
    if let Some(pic) = options.position_independent_code {
        vars.insert("CMAKE_POSITION_INDEPENDENT_CODE".into(), pic.into());
    }
    if let Some(shared) = options.shared_libs {
        vars.insert("BUILD_SHARED_LIBS".into(), shared.into());
    }
    if let Some(ref std) = options.cxx_standard {
        vars.insert("CMAKE_CXX_STANDARD".into(), std.as_str().into());
        vars.insert("CMAKE_CXX_STANDARD_REQUIRED".into(), true.into());
    }

    // Point find_package(<name> CONFIG) at the generated config files.
    for node in graph.nodes() {
        vars.insert(format!("{}_DIR", node.name), generators.clone().into());
    }

    for (name, value) in &options.extra_variables {
        if let Some(previous) = vars.get(name) {
            if previous != value {
                tracing::warn!(
                    "extra variable `{}` overrides generated value `{}` with `{}`",
                    name,
                    previous,
                    value
                );
            }
        }
        vars.insert(name.clone(), value.clone());
    }

    vars
}

/// Render the variables as a CMake toolchain file.
pub fn render_toolchain_cmake(vars: &BTreeMap<String, VariableValue>) -> String {
    let mut out = String::new();
    out.push_str("# Generated by anvil. Do not edit.\n");
    out.push_str(&format!("# anvil-toolchain format {}\n\n", FORMAT_VERSION));
    out.push_str("include_guard()\n\n");

    for (name, value) in vars {
        out.push_str(&format!(
            "set({} {} CACHE {} \"\" FORCE)\n",
            name,
            value.to_cmake(),
            value.cmake_type()
        ));
    }
    out
}

#[derive(Serialize)]
struct ToolchainFile<'a> {
    format_version: u32,
    variables: &'a BTreeMap<String, VariableValue>,
}

/// Render the variables as the versioned JSON descriptor.
pub fn render_toolchain_json(
    vars: &BTreeMap<String, VariableValue>,
) -> Result<String, serde_json::Error> {
    let file = ToolchainFile {
        format_version: FORMAT_VERSION,
        variables: vars,
    };
    Ok(serde_json::to_string_pretty(&file)? + "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{release_settings, resolve_fixture};
    use std::path::Path;

    #[test]
    fn test_base_variables() {
        let settings = release_settings();
        let graph = resolve_fixture(&["gtest>=1.15.0"], &settings);
        let layout = Layout::plan(&settings, Path::new("/proj"));

        let vars = toolchain_variables(&graph, &layout, &settings, &GeneratorOptions::default());

        assert_eq!(vars["CMAKE_BUILD_TYPE"], VariableValue::from("Release"));
        assert_eq!(vars["CMAKE_C_COMPILER"], VariableValue::from("gcc"));
        assert_eq!(vars["CMAKE_CXX_COMPILER"], VariableValue::from("g++"));
        assert_eq!(
            vars["gtest_DIR"],
            VariableValue::from("/proj/build/Release/generators")
        );
        assert_eq!(vars["CMAKE_INSTALL_LIBDIR"], VariableValue::from("lib"));
        assert!(!vars.contains_key("CMAKE_EXPORT_COMPILE_COMMANDS"));
    }

    #[test]
    fn test_recognized_options_and_overrides() {
        let settings = release_settings();
        let graph = resolve_fixture(&[], &settings);
        let layout = Layout::plan(&settings, Path::new("/proj"));
        let options = GeneratorOptions {
            cxx_standard: Some("20".into()),
            shared_libs: Some(false),
            ..Default::default()
        }
        .with_export_compile_commands(true)
        .with_variable("CMAKE_CXX_COMPILER", "g++-13")
        .with_variable("APP_FEATURE_X", true);

        let vars = toolchain_variables(&graph, &layout, &settings, &options);

        assert_eq!(vars["CMAKE_EXPORT_COMPILE_COMMANDS"], VariableValue::Bool(true));
        assert_eq!(vars["CMAKE_CXX_STANDARD"], VariableValue::from("20"));
        assert_eq!(vars["CMAKE_CXX_STANDARD_REQUIRED"], VariableValue::Bool(true));
        assert_eq!(vars["BUILD_SHARED_LIBS"], VariableValue::Bool(false));
        assert_eq!(vars["CMAKE_CXX_COMPILER"], VariableValue::from("g++-13"));
        assert_eq!(vars["APP_FEATURE_X"], VariableValue::Bool(true));
    }

    #[test]
    fn test_render_cmake() {
        let mut vars = BTreeMap::new();
        vars.insert("B_FLAG".to_string(), VariableValue::Bool(true));
        vars.insert("A_NAME".to_string(), VariableValue::from("x"));

        let out = render_toolchain_cmake(&vars);
        let a = out.find("set(A_NAME \"x\" CACHE STRING \"\" FORCE)").unwrap();
        let b = out.find("set(B_FLAG ON CACHE BOOL \"\" FORCE)").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_render_json_is_versioned() {
        let mut vars = BTreeMap::new();
        vars.insert("CMAKE_BUILD_TYPE".to_string(), VariableValue::from("Debug"));

        let json: serde_json::Value =
            serde_json::from_str(&render_toolchain_json(&vars).unwrap()).unwrap();
        assert_eq!(json["format_version"], FORMAT_VERSION);
        assert_eq!(json["variables"]["CMAKE_BUILD_TYPE"], "Debug");
    }
}
