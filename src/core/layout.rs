//! Layout - where a build puts things.
//!
//! The layout is a pure function of the settings and the project root:
//!
//! ```text
//! <root>/build/<build_type>/               build tree
//! <root>/build/<build_type>/generators/    generated descriptors
//! ```
//!
//! Because the build type is part of every path, builds that differ in
//! build type never share a directory and may run concurrently. Two builds
//! with identical settings must not run against the same layout at once.

use std::path::{Path, PathBuf};

use semver::Version;

use crate::core::Settings;

/// Top-level directory under the project root holding all build trees.
pub const BUILD_DIR_NAME: &str = "build";

/// Directory under the build tree holding generated descriptors.
pub const GENERATORS_DIR_NAME: &str = "generators";

/// The directories a build with given settings uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Layout {
    root: PathBuf,
    build_dir: PathBuf,
    generator_dir: PathBuf,
}

impl Layout {
    /// Compute the layout for `settings` under `root`.
    ///
    /// Performs no filesystem access; directories are created by whoever
    /// writes into them.
    pub fn plan(settings: &Settings, root: &Path) -> Layout {
        let build_dir = root.join(BUILD_DIR_NAME).join(settings.build_type());
        let generator_dir = build_dir.join(GENERATORS_DIR_NAME);

        Layout {
            root: root.to_path_buf(),
            build_dir,
            generator_dir,
        }
    }

    /// The project root this layout was planned for.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Build tree for the native build system.
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Directory receiving generated descriptors.
    pub fn generator_dir(&self) -> &Path {
        &self.generator_dir
    }

    /// Whether no directory of `self` lies inside a directory of `other`, or
    /// vice versa.
    pub fn is_disjoint(&self, other: &Layout) -> bool {
        !(self.build_dir.starts_with(&other.build_dir) || other.build_dir.starts_with(&self.build_dir))
    }
}

/// Package-store folder holding the binary package for one resolved node.
///
/// The settings id makes the folder the cache key for a
/// `(name, version, settings)` triple.
pub fn package_dir(store: &Path, name: &str, version: &Version, settings: &Settings) -> PathBuf {
    store
        .join(name)
        .join(version.to_string())
        .join(settings.settings_id())
}
