//! Generator options.
//!
//! The recognized keys are explicit fields; anything else goes through
//! `extra_variables`, which passes values to the toolchain unchanged.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A toolchain variable value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Bool(bool),
    String(String),
}

impl VariableValue {
    /// Render for a CMake `set()` call.
    pub fn to_cmake(&self) -> String {
        match self {
            VariableValue::Bool(true) => "ON".to_string(),
            VariableValue::Bool(false) => "OFF".to_string(),
            VariableValue::String(s) => format!("\"{}\"", escape_cmake(s)),
        }
    }

    /// CMake cache type for this value.
    pub fn cmake_type(&self) -> &'static str {
        match self {
            VariableValue::Bool(_) => "BOOL",
            VariableValue::String(_) => "STRING",
        }
    }
}

impl From<bool> for VariableValue {
    fn from(b: bool) -> Self {
        VariableValue::Bool(b)
    }
}

impl From<&str> for VariableValue {
    fn from(s: &str) -> Self {
        VariableValue::String(s.to_string())
    }
}

impl From<String> for VariableValue {
    fn from(s: String) -> Self {
        VariableValue::String(s)
    }
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableValue::Bool(b) => write!(f, "{}", b),
            VariableValue::String(s) => f.write_str(s),
        }
    }
}

/// Escape a string for use inside a double-quoted CMake argument.
pub fn escape_cmake(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' | '"' | '$' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Options recognized by the descriptor generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorOptions {
    /// Emit `compile_commands.json` from the native build.
    pub export_compile_commands: bool,

    /// `CMAKE_POSITION_INDEPENDENT_CODE`
    pub position_independent_code: Option<bool>,

    /// `BUILD_SHARED_LIBS`
    pub shared_libs: Option<bool>,

    /// `CMAKE_CXX_STANDARD`, e.g. `"17"`.
    pub cxx_standard: Option<String>,

    /// Pass-through variables, merged last.
    #[serde(rename = "variables")]
    pub extra_variables: BTreeMap<String, VariableValue>,
}

impl GeneratorOptions {
    pub fn with_export_compile_commands(mut self, enabled: bool) -> Self {
        self.export_compile_commands = enabled;
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<VariableValue>) -> Self {
        self.extra_variables.insert(name.into(), value.into());
        self
    }
}
