//! Descriptor generation.
//!
//! Turns a resolved graph into the files the native build system reads: a
//! toolchain file, one config and one JSON descriptor per package, and a
//! snapshot of the graph. Rendering is pure; writing happens once at the end,
//! each file atomically, so a failed run leaves no half-written descriptor.

pub mod deps;
pub mod options;
pub mod toolchain;

pub use deps::DependencyPaths;
pub use options::{escape_cmake, GeneratorOptions, VariableValue};

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::{Layout, Settings};
use crate::resolver::ResolvedGraph;
use crate::util::fs::write_atomic;
use crate::util::hash::Fingerprint;

/// Version stamped into every generated file.
pub const FORMAT_VERSION: u32 = 1;

pub const TOOLCHAIN_CMAKE: &str = "toolchain.cmake";
pub const TOOLCHAIN_JSON: &str = "toolchain.json";
pub const GRAPH_JSON: &str = "graph.json";

const DEPS_SUFFIX: &str = "-deps.json";
const CONFIG_SUFFIX: &str = "-config.cmake";

/// Errors from descriptor generation.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("failed to write `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("graph was resolved for `{graph}`, not `{requested}`")]
    SettingsMismatch { graph: Settings, requested: Settings },
}

impl GenerationError {
    fn io(path: &Path, source: impl Into<io::Error>) -> Self {
        GenerationError::Io {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }
}

/// What the generator produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    toolchain_variables: BTreeMap<String, VariableValue>,
    dependency_paths: BTreeMap<String, DependencyPaths>,
    files: BTreeMap<String, String>,
    generator_dir: PathBuf,
}

impl Descriptor {
    pub fn toolchain_variables(&self) -> &BTreeMap<String, VariableValue> {
        &self.toolchain_variables
    }

    pub fn dependency_paths(&self) -> &BTreeMap<String, DependencyPaths> {
        &self.dependency_paths
    }

    /// Generated file names and their contents, in name order.
    pub fn files(&self) -> &BTreeMap<String, String> {
        &self.files
    }

    pub fn generator_dir(&self) -> &Path {
        &self.generator_dir
    }

    /// Path of the CMake toolchain file.
    pub fn toolchain_file(&self) -> PathBuf {
        self.generator_dir.join(TOOLCHAIN_CMAKE)
    }

    /// Hash of every generated file, in name order.
    pub fn fingerprint(&self) -> String {
        let mut fp = Fingerprint::new();
        for (name, content) in &self.files {
            fp.update_kv(name, content);
        }
        fp.finish()
    }
}

/// Produces build-system descriptors from a resolved graph.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    options: GeneratorOptions,
}

impl Generator {
    pub fn new(options: GeneratorOptions) -> Self {
        Generator { options }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Render and write every descriptor into `layout.generator_dir()`.
    ///
    /// Package folders are located under `store`.
    pub fn generate(
        &self,
        graph: &ResolvedGraph,
        layout: &Layout,
        settings: &Settings,
        store: &Path,
    ) -> Result<Descriptor, GenerationError> {
        let descriptor = self.render(graph, layout, settings, store)?;
        write_descriptor(&descriptor)?;

        tracing::info!(
            "generated {} file(s) in {}",
            descriptor.files.len(),
            descriptor.generator_dir.display()
        );
        Ok(descriptor)
    }

    /// Compute the descriptor without touching the filesystem.
    pub fn render(
        &self,
        graph: &ResolvedGraph,
        layout: &Layout,
        settings: &Settings,
        store: &Path,
    ) -> Result<Descriptor, GenerationError> {
        if graph.settings() != settings {
            return Err(GenerationError::SettingsMismatch {
                graph: graph.settings().clone(),
                requested: settings.clone(),
            });
        }

        let generator_dir = layout.generator_dir().to_path_buf();
        let vars = toolchain::toolchain_variables(graph, layout, settings, &self.options);
        let paths = deps::dependency_paths(graph, store, settings);

        let mut files = BTreeMap::new();
        files.insert(
            TOOLCHAIN_CMAKE.to_string(),
            toolchain::render_toolchain_cmake(&vars),
        );
        files.insert(
            TOOLCHAIN_JSON.to_string(),
            toolchain::render_toolchain_json(&vars)
                .map_err(|e| GenerationError::io(&generator_dir.join(TOOLCHAIN_JSON), e))?,
        );
        files.insert(
            GRAPH_JSON.to_string(),
            deps::render_graph_json(graph)
                .map_err(|e| GenerationError::io(&generator_dir.join(GRAPH_JSON), e))?,
        );

        for node in graph.nodes() {
            let Some(node_paths) = paths.get(&node.name) else {
                continue;
            };
            let deps_name = format!("{}{}", node.name, DEPS_SUFFIX);
            let json = deps::render_deps_json(node, node_paths)
                .map_err(|e| GenerationError::io(&generator_dir.join(&deps_name), e))?;
            files.insert(deps_name, json);
            files.insert(
                format!("{}{}", node.name, CONFIG_SUFFIX),
                deps::render_config_cmake(node, node_paths),
            );
        }

        Ok(Descriptor {
            toolchain_variables: vars,
            dependency_paths: paths,
            files,
            generator_dir,
        })
    }
}

fn write_descriptor(descriptor: &Descriptor) -> Result<(), GenerationError> {
    let dir = descriptor.generator_dir();
    fs::create_dir_all(dir).map_err(|e| GenerationError::io(dir, e))?;

    for (name, content) in &descriptor.files {
        let path = dir.join(name);
        write_atomic(&path, content.as_bytes()).map_err(|e| GenerationError::io(&path, e))?;
        tracing::debug!("wrote {}", path.display());
    }

    remove_stale(dir, &descriptor.files)
}

/// Remove package descriptors left over from an earlier graph.
fn remove_stale(dir: &Path, current: &BTreeMap<String, String>) -> Result<(), GenerationError> {
    let entries = fs::read_dir(dir).map_err(|e| GenerationError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| GenerationError::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let ours = name.ends_with(DEPS_SUFFIX) || name.ends_with(CONFIG_SUFFIX);
        if ours && !current.contains_key(&name) {
            let path = entry.path();
            fs::remove_file(&path).map_err(|e| GenerationError::io(&path, e))?;
            tracing::debug!("removed stale {}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RawSettings, SettingsPolicy};
    use crate::test_support::{release_settings, resolve_fixture};
    use tempfile::TempDir;

    #[test]
    fn test_generate_writes_all_files() {
        let tmp = TempDir::new().unwrap();
        let settings = release_settings();
        let graph = resolve_fixture(&["gtest>=1.15.0"], &settings);
        let layout = Layout::plan(&settings, tmp.path());

        let descriptor = Generator::default()
            .generate(&graph, &layout, &settings, &tmp.path().join("store"))
            .unwrap();

        for name in [
            TOOLCHAIN_CMAKE,
            TOOLCHAIN_JSON,
            GRAPH_JSON,
            "gtest-deps.json",
            "gtest-config.cmake",
        ] {
            assert!(layout.generator_dir().join(name).is_file(), "missing {}", name);
        }
        assert_eq!(descriptor.files().len(), 5);
        assert_eq!(
            descriptor.toolchain_variables()["CMAKE_BUILD_TYPE"],
            VariableValue::from("Release")
        );
        assert!(descriptor.dependency_paths().contains_key("gtest"));
    }

    #[test]
    fn test_generate_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let settings = release_settings();
        let graph = resolve_fixture(&["app-core"], &settings);
        let layout = Layout::plan(&settings, tmp.path());
        let store = tmp.path().join("store");
        let generator = Generator::new(GeneratorOptions::default().with_export_compile_commands(true));

        let first = generator.generate(&graph, &layout, &settings, &store).unwrap();
        let toolchain = layout.generator_dir().join(TOOLCHAIN_CMAKE);
        let bytes_first = std::fs::read(&toolchain).unwrap();

        let second = generator.generate(&graph, &layout, &settings, &store).unwrap();
        let bytes_second = std::fs::read(&toolchain).unwrap();

        assert_eq!(first.fingerprint(), second.fingerprint());
        assert_eq!(bytes_first, bytes_second);
    }

    #[test]
    fn test_fingerprint_tracks_options() {
        let tmp = TempDir::new().unwrap();
        let settings = release_settings();
        let graph = resolve_fixture(&[], &settings);
        let layout = Layout::plan(&settings, tmp.path());

        let plain = Generator::default()
            .render(&graph, &layout, &settings, tmp.path())
            .unwrap();
        let with_db = Generator::new(GeneratorOptions::default().with_export_compile_commands(true))
            .render(&graph, &layout, &settings, tmp.path())
            .unwrap();

        assert_ne!(plain.fingerprint(), with_db.fingerprint());
        assert!(with_db.files()[TOOLCHAIN_CMAKE].contains("CMAKE_EXPORT_COMPILE_COMMANDS ON"));
    }

    #[test]
    fn test_stale_package_files_removed() {
        let tmp = TempDir::new().unwrap();
        let settings = release_settings();
        let layout = Layout::plan(&settings, tmp.path());
        let store = tmp.path().join("store");

        let before = resolve_fixture(&["app-core"], &settings);
        Generator::default().generate(&before, &layout, &settings, &store).unwrap();
        assert!(layout.generator_dir().join("zlib-deps.json").exists());

        let after = resolve_fixture(&["gtest>=1.15.0"], &settings);
        Generator::default().generate(&after, &layout, &settings, &store).unwrap();
        assert!(!layout.generator_dir().join("zlib-deps.json").exists());
        assert!(!layout.generator_dir().join("app-core-config.cmake").exists());
        assert!(layout.generator_dir().join("gtest-config.cmake").exists());
    }

    #[test]
    fn test_settings_mismatch_rejected() {
        let tmp = TempDir::new().unwrap();
        let settings = release_settings();
        let graph = resolve_fixture(&[], &settings);

        let mut raw = RawSettings::default();
        raw.set("os", "Linux").unwrap();
        raw.set("compiler", "gcc").unwrap();
        raw.set("build_type", "Debug").unwrap();
        raw.set("arch", "x86_64").unwrap();
        let debug = raw.normalize(&SettingsPolicy::default()).unwrap();
        let layout = Layout::plan(&debug, tmp.path());

        let err = Generator::default()
            .generate(&graph, &layout, &debug, tmp.path())
            .unwrap_err();
        assert!(matches!(err, GenerationError::SettingsMismatch { .. }));
        assert!(!layout.generator_dir().exists());
    }

    #[test]
    fn test_unwritable_generator_dir_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let settings = release_settings();
        let graph = resolve_fixture(&[], &settings);
        // A regular file where the build directory should be.
        std::fs::write(tmp.path().join("build"), "").unwrap();
        let layout = Layout::plan(&settings, tmp.path());

        let err = Generator::default()
            .generate(&graph, &layout, &settings, tmp.path())
            .unwrap_err();
        match err {
            GenerationError::Io { path, .. } => assert_eq!(path, layout.generator_dir()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
