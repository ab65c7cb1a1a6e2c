//! Shared fixtures and mocks for unit tests.
//!
//! ```rust,ignore
//! use crate::test_support::{release_settings, resolve_fixture, ScriptedTool};
//!
//! let graph = resolve_fixture(&["gtest>=1.15.0"], &release_settings());
//! let tool = ScriptedTool::new().installing(&["lib/libgtest.a"]);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;

use semver::Version;

use crate::core::{RawSettings, Requirement, Settings, SettingsPolicy};
use crate::pipeline::{BuildTool, Invocation, Stage, ToolOutput};
use crate::resolver::{ResolvedGraph, Resolver};
use crate::sources::{MemoryIndex, PackageInfo};

/// Build an index from `(name, version, requirements)` triples.
///
/// Every package gets the default directories and a library named after it.
pub fn index_from(packages: &[(&str, &str, &[&str])]) -> MemoryIndex {
    let mut index = MemoryIndex::new();
    for (name, version, requires) in packages {
        let requirements: Vec<Requirement> = requires
            .iter()
            .map(|r| r.parse().expect("fixture requirement"))
            .collect();
        index.insert(
            *name,
            Version::parse(version).expect("fixture version"),
            requirements,
            PackageInfo::with_libs([name.replace('-', "_")]),
        );
    }
    index
}

/// A small index with realistic library names.
pub fn fixture_index() -> MemoryIndex {
    let mut index = index_from(&[
        ("gtest", "1.14.0", &[]),
        ("app-core", "1.0.0", &["zlib>=1.2"]),
        ("zlib", "1.2.13", &[]),
        ("zlib", "1.3.1", &[]),
    ]);
    index.insert(
        "gtest",
        Version::new(1, 15, 0),
        Vec::new(),
        PackageInfo::with_libs(["gtest", "gtest_main"]),
    );
    index
}

/// Resolve `requirements` against [`fixture_index`].
pub fn resolve_fixture(requirements: &[&str], settings: &Settings) -> ResolvedGraph {
    let reqs: Vec<Requirement> = requirements
        .iter()
        .map(|r| r.parse().expect("fixture requirement"))
        .collect();
    Resolver::new(fixture_index())
        .resolve(&reqs, settings)
        .expect("fixture resolves")
}

/// `os=Linux compiler=gcc build_type=Release arch=x86_64`.
pub fn release_settings() -> Settings {
    let raw = RawSettings {
        os: Some("Linux".into()),
        compiler: Some("gcc".into()),
        build_type: Some("Release".into()),
        arch: Some("x86_64".into()),
    };
    raw.normalize(&SettingsPolicy::default())
        .expect("release settings are valid")
}

/// A build tool that records invocations and answers from a script.
///
/// Stages without a scripted answer succeed. Files registered with
/// [`ScriptedTool::installing`] are created under the package root by a
/// successful install step.
#[derive(Debug, Default)]
pub struct ScriptedTool {
    responses: HashMap<Stage, ToolOutput>,
    installs: Vec<String>,
    unavailable: bool,
    invocations: RefCell<Vec<Invocation>>,
}

impl ScriptedTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, stage: Stage, output: ToolOutput) -> Self {
        self.responses.insert(stage, output);
        self
    }

    pub fn installing(mut self, files: &[&str]) -> Self {
        self.installs.extend(files.iter().map(|f| f.to_string()));
        self
    }

    /// Fail every run as if the executable were missing.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.borrow().clone()
    }

    pub fn steps(&self) -> Vec<Stage> {
        self.invocations.borrow().iter().map(|i| i.step).collect()
    }
}

impl BuildTool for ScriptedTool {
    fn run(&self, invocation: &Invocation) -> io::Result<ToolOutput> {
        if self.unavailable {
            return Err(io::Error::new(io::ErrorKind::NotFound, "tool not found"));
        }
        self.invocations.borrow_mut().push(invocation.clone());

        let output = self
            .responses
            .get(&invocation.step)
            .cloned()
            .unwrap_or_else(ToolOutput::success);

        if invocation.step == Stage::Install && output.is_success() {
            if let Some(ref root) = invocation.package_root {
                for file in &self.installs {
                    let path = root.join(file);
                    if let Some(parent) = path.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::write(&path, "")?;
                }
            }
        }
        Ok(output)
    }
}
