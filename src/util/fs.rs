//! Filesystem utilities.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Replace `path` with `contents` without ever exposing a partial file.
///
/// The data is written to a temporary file in the destination directory and
/// renamed over the target, so readers observe either the old or the new
/// content. The parent directory must already exist.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Check whether a directory tree contains at least one regular file.
pub fn contains_files(root: &Path) -> bool {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .any(|entry| entry.file_type().is_file())
}

/// Render a path with forward slashes, as CMake expects on every platform.
pub fn to_cmake_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
