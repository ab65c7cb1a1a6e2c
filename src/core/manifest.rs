//! Recipe manifest (`Anvil.toml`) parsing.
//!
//! ```toml
//! [package]
//! name = "cpp-cli"
//! version = "1.0.0"
//! requires = ["gtest>=1.15.0"]
//!
//! [settings]
//! build_type = "Release"
//!
//! [generate]
//! export_compile_commands = true
//!
//! [build]
//! package = true
//!
//! [[component]]
//! name = "cli"
//! libs = ["cpp_cli"]
//! ```
//!
//! Requirements are an array so that declaration order, which drives
//! resolution order, survives parsing.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use semver::Version;
use serde::Deserialize;

use crate::core::requirement::validate_package_name;
use crate::core::{Component, RawSettings, Requirement};
use crate::generator::GeneratorOptions;
use crate::resolver::version::parse_version_lenient;
use crate::util::fs::read_to_string;

/// Recipe file name.
pub const MANIFEST_NAME: &str = "Anvil.toml";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    package: RawPackage,

    #[serde(default)]
    settings: RawSettings,

    #[serde(default)]
    generate: GeneratorOptions,

    #[serde(default)]
    build: BuildSection,

    #[serde(default, rename = "component")]
    components: Vec<RawComponent>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPackage {
    name: String,
    version: String,
    #[serde(default)]
    requires: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawComponent {
    name: String,
    #[serde(default)]
    libs: Vec<String>,
    #[serde(default)]
    target: Option<String>,
}

/// The `[build]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSection {
    /// Run the install and package stages after building.
    pub package: bool,

    /// Parallel jobs passed to the build tool.
    pub jobs: Option<usize>,

    /// Source directory for the build tool, relative to the recipe.
    pub source_dir: Option<PathBuf>,
}

impl Default for BuildSection {
    fn default() -> Self {
        BuildSection {
            package: true,
            jobs: None,
            source_dir: None,
        }
    }
}

/// A parsed recipe.
#[derive(Debug, Clone)]
pub struct Manifest {
    name: String,
    version: Version,
    requirements: Vec<Requirement>,
    settings: RawSettings,
    generate: GeneratorOptions,
    build: BuildSection,
    components: Vec<Component>,
    root: PathBuf,
}

impl Manifest {
    /// Load a manifest from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_to_string(path)?;

        Self::parse(&content, path)
    }

    /// Parse manifest content; `path` locates the recipe root.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let raw: RawManifest = toml::from_str(content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let name = raw.package.name;
        validate_package_name(&name)
            .with_context(|| format!("invalid [package] name in {}", path.display()))?;

        let version = parse_version_lenient(&raw.package.version).with_context(|| {
            format!(
                "invalid [package] version `{}` in {}",
                raw.package.version,
                path.display()
            )
        })?;

        let requirements = raw
            .package
            .requires
            .iter()
            .map(|text| {
                text.parse::<Requirement>()
                    .with_context(|| format!("invalid requirement `{}`", text))
            })
            .collect::<Result<Vec<_>>>()?;

        let components = if raw.components.is_empty() {
            vec![Component::new(&name, name.clone(), vec![name.replace('-', "_")])]
        } else {
            let mut seen = HashSet::new();
            let mut components = Vec::with_capacity(raw.components.len());
            for c in raw.components {
                if c.name.trim().is_empty() {
                    bail!("component with empty name in {}", path.display());
                }
                if !seen.insert(c.name.clone()) {
                    bail!("duplicate component `{}` in {}", c.name, path.display());
                }
                let mut component = Component::new(&name, c.name, c.libs);
                if let Some(target) = c.target {
                    component = component.with_target(target);
                }
                components.push(component);
            }
            components
        };

        let root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();

        Ok(Manifest {
            name,
            version,
            requirements,
            settings: raw.settings,
            generate: raw.generate,
            build: raw.build,
            components,
            root,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Requirements in declaration order.
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Settings declared by the recipe (may be partial).
    pub fn settings(&self) -> &RawSettings {
        &self.settings
    }

    pub fn generate(&self) -> &GeneratorOptions {
        &self.generate
    }

    /// Generator options, for command-line overrides.
    pub fn generate_mut(&mut self) -> &mut GeneratorOptions {
        &mut self.generate
    }

    pub fn build(&self) -> &BuildSection {
        &self.build
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Directory containing the recipe.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Source directory handed to the build tool.
    pub fn source_dir(&self) -> PathBuf {
        match self.build.source_dir {
            Some(ref dir) => self.root.join(dir),
            None => self.root.clone(),
        }
    }
}

/// Find the recipe by walking up from `start`.
pub fn find_manifest(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(MANIFEST_NAME))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::VariableValue;

    const RECIPE: &str = r#"
[package]
name = "cpp-cli"
version = "1.0.0"
requires = ["gtest>=1.15.0", "zlib/1.3.1"]

[settings]
build_type = "Release"

[generate]
export_compile_commands = true

[generate.variables]
ENABLE_LOGGING = true
LOG_LEVEL = "debug"

[build]
package = false
jobs = 4

[[component]]
name = "cli"
libs = ["cpp_cli", "cli_core"]
target = "CppCli::cli"
"#;

    #[test]
    fn test_parse_full_recipe() {
        let manifest = Manifest::parse(RECIPE, Path::new("/proj/Anvil.toml")).unwrap();

        assert_eq!(manifest.name(), "cpp-cli");
        assert_eq!(manifest.version(), &Version::new(1, 0, 0));
        let names: Vec<_> = manifest.requirements().iter().map(|r| r.name()).collect();
        assert_eq!(names, ["gtest", "zlib"]);
        assert_eq!(manifest.settings().build_type.as_deref(), Some("Release"));
        assert!(manifest.settings().os.is_none());
        assert!(manifest.generate().export_compile_commands);
        assert_eq!(
            manifest.generate().extra_variables.get("ENABLE_LOGGING"),
            Some(&VariableValue::Bool(true))
        );
        assert!(!manifest.build().package);
        assert_eq!(manifest.build().jobs, Some(4));
        assert_eq!(manifest.components().len(), 1);
        assert_eq!(manifest.components()[0].exported_target_name, "CppCli::cli");
        assert_eq!(manifest.root(), Path::new("/proj"));
        assert_eq!(manifest.source_dir(), PathBuf::from("/proj"));
    }

    #[test]
    fn test_default_component() {
        let manifest = Manifest::parse(
            "[package]\nname = \"my-lib\"\nversion = \"0.2\"\n",
            Path::new("Anvil.toml"),
        )
        .unwrap();

        assert_eq!(manifest.version(), &Version::new(0, 2, 0));
        let component = &manifest.components()[0];
        assert_eq!(component.name, "my-lib");
        assert_eq!(component.libs, vec!["my_lib".to_string()]);
        assert_eq!(component.exported_target_name, "my-lib::my-lib");
        assert!(manifest.build().package);
    }

    #[test]
    fn test_rejects_unknown_generate_key() {
        let content = "[package]\nname = \"a\"\nversion = \"1.0.0\"\n\n[generate]\nexport_compile_command = true\n";
        assert!(Manifest::parse(content, Path::new("Anvil.toml")).is_err());
    }

    #[test]
    fn test_rejects_duplicate_components() {
        let content = r#"
[package]
name = "a"
version = "1.0.0"

[[component]]
name = "core"

[[component]]
name = "core"
"#;
        let err = Manifest::parse(content, Path::new("Anvil.toml")).unwrap_err();
        assert!(err.to_string().contains("duplicate component"));
    }

    #[test]
    fn test_bad_requirement_is_reported() {
        let content = "[package]\nname = \"a\"\nversion = \"1.0.0\"\nrequires = [\"gtest>=x\"]\n";
        let err = Manifest::parse(content, Path::new("Anvil.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("gtest>=x"));
    }

    #[test]
    fn test_find_manifest_walks_up() {
        let tmp = tempfile::TempDir::new().unwrap();
        let nested = tmp.path().join("src/app");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(tmp.path().join(MANIFEST_NAME), RECIPE).unwrap();

        assert_eq!(find_manifest(&nested), Some(tmp.path().join(MANIFEST_NAME)));
    }
}
