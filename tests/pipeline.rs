//! End-to-end tests of resolve, generate and the build pipeline through the
//! library API, with a build tool that fakes CMake's side effects.

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::Path;

use anvil::core::{Component, Layout, RawSettings, Settings, SettingsPolicy};
use anvil::generator::{Generator, GeneratorOptions};
use anvil::pipeline::{
    BuildTool, Invocation, Pipeline, PipelineError, PipelineOptions, PipelineState, Stage,
    ToolOutput, EXPORT_FILE,
};
use anvil::resolver::Resolver;
use anvil::sources::{MemoryIndex, PackageInfo};
use anvil::Requirement;
use semver::Version;
use tempfile::TempDir;

/// Installs `lib/lib<name>.a` for every library it was told about.
struct FakeCMake {
    libs: Vec<&'static str>,
    fail_build: bool,
    steps: RefCell<Vec<Stage>>,
}

impl FakeCMake {
    fn new(libs: &[&'static str]) -> Self {
        FakeCMake {
            libs: libs.to_vec(),
            fail_build: false,
            steps: RefCell::new(Vec::new()),
        }
    }
}

impl BuildTool for FakeCMake {
    fn run(&self, inv: &Invocation) -> io::Result<ToolOutput> {
        self.steps.borrow_mut().push(inv.step);
        match inv.step {
            Stage::Configure => {
                assert!(inv.toolchain_file.is_file());
                fs::write(inv.build_dir.join("CMakeCache.txt"), "")?;
            }
            Stage::Build if self.fail_build => {
                return Ok(ToolOutput {
                    status: None,
                    stdout: String::new(),
                    stderr: "terminated".into(),
                })
            }
            Stage::Install => {
                let root = inv.package_root.as_ref().expect("install prefix");
                fs::create_dir_all(root.join("lib"))?;
                for lib in &self.libs {
                    fs::write(root.join("lib").join(format!("lib{}.a", lib)), "")?;
                }
            }
            _ => {}
        }
        Ok(ToolOutput {
            status: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

fn settings(build_type: &str) -> Settings {
    RawSettings {
        os: Some("Linux".into()),
        compiler: Some("gcc".into()),
        build_type: Some(build_type.into()),
        arch: Some("x86_64".into()),
    }
    .normalize(&SettingsPolicy::default())
    .unwrap()
}

fn index() -> MemoryIndex {
    let mut index = MemoryIndex::new();
    index.insert(
        "gtest",
        Version::new(1, 14, 0),
        Vec::new(),
        PackageInfo::with_libs(["gtest"]),
    );
    index.insert(
        "gtest",
        Version::new(1, 15, 0),
        Vec::new(),
        PackageInfo::with_libs(["gtest", "gtest_main"]),
    );
    index
}

fn requirements() -> Vec<Requirement> {
    vec!["gtest>=1.15.0".parse().unwrap()]
}

/// Resolve, generate and run a full pipeline for one build type.
fn build(root: &Path, store: &Path, build_type: &str, tool: &FakeCMake) -> Result<Layout, PipelineError> {
    let settings = settings(build_type);
    let graph = Resolver::new(index()).resolve(&requirements(), &settings).unwrap();
    assert_eq!(graph.node("gtest").unwrap().version, Version::new(1, 15, 0));

    let layout = Layout::plan(&settings, root);
    let descriptor = Generator::new(GeneratorOptions::default())
        .generate(&graph, &layout, &settings, store)
        .unwrap();

    let components = vec![Component::new("cpp-cli", "cli", vec!["cpp_cli".into()])];
    let package_root = root.join("package").join(build_type);
    let mut pipeline = Pipeline::new(tool, layout.clone(), settings);
    let export = pipeline
        .run(&descriptor, &package_root, &components, PipelineOptions::default())?
        .expect("packaging enabled");

    assert_eq!(pipeline.state(), PipelineState::Packaged);
    assert_eq!(export.components.len(), 1);
    assert!(!export.components[0].libs.is_empty());
    assert!(package_root.join(EXPORT_FILE).is_file());
    Ok(layout)
}

#[test]
fn test_release_build_is_packaged() {
    let tmp = TempDir::new().unwrap();
    let tool = FakeCMake::new(&["cpp_cli"]);

    let layout = build(tmp.path(), &tmp.path().join("store"), "Release", &tool).unwrap();

    assert_eq!(layout.build_dir(), tmp.path().join("build/Release"));
    assert!(layout.generator_dir().join("gtest-config.cmake").is_file());
    assert!(layout.build_dir().join("CMakeCache.txt").is_file());
    assert_eq!(
        *tool.steps.borrow(),
        vec![Stage::Configure, Stage::Build, Stage::Install]
    );
}

#[test]
fn test_build_types_run_concurrently_in_disjoint_layouts() {
    let tmp = TempDir::new().unwrap();
    let store = tmp.path().join("store");

    let (debug, release) = std::thread::scope(|s| {
        let debug = s.spawn(|| build(tmp.path(), &store, "Debug", &FakeCMake::new(&["cpp_cli"])));
        let release = s.spawn(|| build(tmp.path(), &store, "Release", &FakeCMake::new(&["cpp_cli"])));
        (debug.join().unwrap().unwrap(), release.join().unwrap().unwrap())
    });

    assert!(debug.is_disjoint(&release));
    assert!(debug.generator_dir().join("toolchain.cmake").is_file());
    assert!(release.generator_dir().join("toolchain.cmake").is_file());
}

#[test]
fn test_interrupted_build_stops_pipeline() {
    let tmp = TempDir::new().unwrap();
    let mut tool = FakeCMake::new(&["cpp_cli"]);
    tool.fail_build = true;

    let err = build(tmp.path(), &tmp.path().join("store"), "Release", &tool).unwrap_err();

    assert!(matches!(err, PipelineError::Build { interrupted: true, .. }));
    assert_eq!(*tool.steps.borrow(), vec![Stage::Configure, Stage::Build]);
    assert!(!tmp.path().join("package/Release").exists());
}

#[test]
fn test_missing_library_is_reported() {
    let tmp = TempDir::new().unwrap();
    let tool = FakeCMake::new(&["something_else"]);

    let err = build(tmp.path(), &tmp.path().join("store"), "Release", &tool).unwrap_err();

    match err {
        PipelineError::MissingArtifact { component, file } => {
            assert_eq!(component, "cli");
            assert!(file.ends_with("lib/libcpp_cli.a"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
