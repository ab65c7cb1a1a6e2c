//! Settings - the platform axes every build is parameterized by.
//!
//! A [`Settings`] value is the validated, immutable form of
//! `{os, compiler, build_type, arch}`. It is the identity key for layouts,
//! package-store paths and descriptors; two builds with equal settings are the
//! same build.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::hash::Fingerprint;

/// Build types accepted when no allow-list is configured.
pub const DEFAULT_BUILD_TYPES: &[&str] = &["Debug", "Release", "RelWithDebInfo", "MinSizeRel"];

/// Names of the four axes, in canonical order.
pub const AXES: [&str; 4] = ["os", "compiler", "build_type", "arch"];

/// Error produced while normalizing raw settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("invalid settings: missing {}", .missing.join(", "))]
    MissingAxes { missing: Vec<&'static str> },

    #[error(
        "invalid settings: build_type `{build_type}` is not one of: {}",
        .allowed.join(", ")
    )]
    BuildTypeNotAllowed {
        build_type: String,
        allowed: Vec<String>,
    },

    #[error("invalid settings: `{axis}` value `{value}` cannot be used in a path")]
    InvalidValue { axis: &'static str, value: String },

    #[error("invalid settings: unknown setting `{0}` (expected one of os, compiler, build_type, arch)")]
    UnknownAxis(String),
}

/// Which settings values are acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsPolicy {
    build_types: Vec<String>,
}

impl SettingsPolicy {
    /// A policy accepting exactly the given build types (case-sensitive).
    pub fn with_build_types<I, S>(build_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SettingsPolicy {
            build_types: build_types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn build_types(&self) -> &[String] {
        &self.build_types
    }

    pub fn allows_build_type(&self, build_type: &str) -> bool {
        self.build_types.iter().any(|b| b == build_type)
    }
}

impl Default for SettingsPolicy {
    fn default() -> Self {
        Self::with_build_types(DEFAULT_BUILD_TYPES.iter().copied())
    }
}

/// Settings as they arrive from the recipe, config files or the command line.
///
/// Any axis may be absent; [`RawSettings::normalize`] turns a complete set into
/// [`Settings`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSettings {
    pub os: Option<String>,
    pub compiler: Option<String>,
    pub build_type: Option<String>,
    pub arch: Option<String>,
}

impl RawSettings {
    /// Settings describing the host, with no build type.
    pub fn detect() -> Self {
        let os = match std::env::consts::OS {
            "linux" => "Linux",
            "macos" => "Macos",
            "windows" => "Windows",
            "freebsd" => "FreeBSD",
            other => other,
        };
        let compiler = match std::env::consts::OS {
            "macos" => "apple-clang",
            "windows" => "msvc",
            _ => "gcc",
        };
        let arch = match std::env::consts::ARCH {
            "aarch64" => "armv8",
            other => other,
        };

        RawSettings {
            os: Some(os.to_string()),
            compiler: Some(compiler.to_string()),
            build_type: None,
            arch: Some(arch.to_string()),
        }
    }

    /// Set a single axis by name, as in `-s build_type=Release`.
    pub fn set(&mut self, axis: &str, value: impl Into<String>) -> Result<(), SettingsError> {
        let value = Some(value.into());
        match axis {
            "os" => self.os = value,
            "compiler" => self.compiler = value,
            "build_type" => self.build_type = value,
            "arch" => self.arch = value,
            other => return Err(SettingsError::UnknownAxis(other.to_string())),
        }
        Ok(())
    }

    /// Parse a `key=value` assignment and apply it.
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<(), SettingsError> {
        match assignment.split_once('=') {
            Some((key, value)) => self.set(key.trim(), value.trim()),
            None => Err(SettingsError::UnknownAxis(assignment.to_string())),
        }
    }

    /// Layer `other` on top of `self`; axes present in `other` win.
    pub fn merge(self, other: RawSettings) -> RawSettings {
        RawSettings {
            os: other.os.or(self.os),
            compiler: other.compiler.or(self.compiler),
            build_type: other.build_type.or(self.build_type),
            arch: other.arch.or(self.arch),
        }
    }

    /// Validate and freeze into [`Settings`].
    pub fn normalize(&self, policy: &SettingsPolicy) -> Result<Settings, SettingsError> {
        let settings = self.complete()?;
        if !policy.allows_build_type(&settings.build_type) {
            return Err(SettingsError::BuildTypeNotAllowed {
                build_type: settings.build_type,
                allowed: policy.build_types().to_vec(),
            });
        }
        Ok(settings)
    }

    /// Check that every axis is set to a usable value, without applying a
    /// build-type policy.
    fn complete(&self) -> Result<Settings, SettingsError> {
        let axes = [&self.os, &self.compiler, &self.build_type, &self.arch];
        let values: Vec<Option<&str>> = axes
            .iter()
            .map(|v| v.as_deref().map(str::trim).filter(|v| !v.is_empty()))
            .collect();

        let missing: Vec<&'static str> = AXES
            .iter()
            .zip(&values)
            .filter(|(_, v)| v.is_none())
            .map(|(axis, _)| *axis)
            .collect();
        if !missing.is_empty() {
            return Err(SettingsError::MissingAxes { missing });
        }

        for (axis, value) in AXES.iter().zip(&values) {
            let value = value.unwrap_or_default();
            if value.contains(['/', '\\']) || value == "." || value == ".." {
                return Err(SettingsError::InvalidValue {
                    axis: *axis,
                    value: value.to_string(),
                });
            }
        }

        let build_type = values[2].unwrap_or_default();
        Ok(Settings {
            os: values[0].unwrap_or_default().to_string(),
            compiler: values[1].unwrap_or_default().to_string(),
            build_type: build_type.to_string(),
            arch: values[3].unwrap_or_default().to_string(),
        })
    }
}

/// A complete, validated settings tuple.
///
/// Every `Settings` has all four axes set to path-safe values. Built by
/// [`Settings::normalize`], which also applies the build-type allow-list, or
/// deserialized from recorded metadata such as a package export, which
/// checks the axes but accepts any build type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawSettings")]
pub struct Settings {
    os: String,
    compiler: String,
    build_type: String,
    arch: String,
}

impl Settings {
    /// Validate raw settings against a policy.
    pub fn normalize(raw: &RawSettings, policy: &SettingsPolicy) -> Result<Settings, SettingsError> {
        raw.normalize(policy)
    }

    pub fn os(&self) -> &str {
        &self.os
    }

    pub fn compiler(&self) -> &str {
        &self.compiler
    }

    pub fn build_type(&self) -> &str {
        &self.build_type
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Whether the target OS is Windows.
    pub fn is_windows(&self) -> bool {
        self.os.eq_ignore_ascii_case("windows")
    }

    /// Whether the target OS is an Apple platform.
    pub fn is_apple(&self) -> bool {
        matches!(
            self.os.to_ascii_lowercase().as_str(),
            "macos" | "ios" | "tvos" | "watchos"
        )
    }

    /// `(axis, value)` pairs in canonical order.
    pub fn pairs(&self) -> [(&'static str, &str); 4] {
        [
            ("os", &self.os),
            ("compiler", &self.compiler),
            ("build_type", &self.build_type),
            ("arch", &self.arch),
        ]
    }

    /// Short stable id of this tuple, used as the package-store cache key.
    pub fn settings_id(&self) -> String {
        let mut fp = Fingerprint::new();
        for (axis, value) in self.pairs() {
            fp.update_kv(axis, value);
        }
        fp.finish_short()
    }
}

impl TryFrom<RawSettings> for Settings {
    type Error = SettingsError;

    fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
        raw.complete()
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "os={} compiler={} build_type={} arch={}",
            self.os, self.compiler, self.build_type, self.arch
        )
    }
}
