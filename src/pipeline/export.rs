//! Package export metadata.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::Settings;
use crate::generator::FORMAT_VERSION;

/// File written at the package root after a successful package stage.
pub const EXPORT_FILE: &str = "anvil-package.json";

/// Directory under the package root holding libraries.
///
/// Pinned through `CMAKE_INSTALL_LIBDIR` in the generated toolchain.
pub const LIB_DIR: &str = "lib";

/// Library directories searched under the package root, in order.
/// `lib64` is where GNUInstallDirs puts libraries on some 64-bit distros
/// when a project overrides the pinned libdir.
pub const LIB_DIRS: &[&str] = &[LIB_DIR, "lib64"];

/// A component as consumers see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedComponent {
    pub name: String,
    pub target: String,
    pub libs: Vec<String>,
    /// Library files, relative to the package root.
    pub files: Vec<String>,
}

/// What a packaged build exports downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageExport {
    pub format_version: u32,
    pub settings: Settings,
    pub components: Vec<ExportedComponent>,
}

impl PackageExport {
    pub fn new(settings: Settings, components: Vec<ExportedComponent>) -> Self {
        PackageExport {
            format_version: FORMAT_VERSION,
            settings,
            components,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        Ok(serde_json::to_string_pretty(self)? + "\n")
    }
}

/// File names a library may have on the target platform, in preference order.
pub fn library_candidates(lib: &str, settings: &Settings) -> Vec<String> {
    if settings.is_windows() {
        vec![
            format!("{}.lib", lib),
            format!("lib{}.a", lib),
            format!("{}.dll", lib),
        ]
    } else if settings.is_apple() {
        vec![format!("lib{}.a", lib), format!("lib{}.dylib", lib)]
    } else {
        vec![format!("lib{}.a", lib), format!("lib{}.so", lib)]
    }
}

/// Find `lib` in the library directories under `package_root`.
///
/// Returns the matched file relative to the package root, with forward
/// slashes. On failure returns the preferred relative path, for error
/// reporting.
pub fn locate_library(package_root: &Path, lib: &str, settings: &Settings) -> Result<String, String> {
    let candidates = library_candidates(lib, settings);
    for dir in LIB_DIRS {
        for candidate in &candidates {
            if package_root.join(dir).join(candidate).is_file() {
                return Ok(format!("{}/{}", dir, candidate));
            }
        }
    }
    let preferred = candidates.into_iter().next().unwrap_or_else(|| lib.to_string());
    Err(format!("{}/{}", LIB_DIR, preferred))
}
