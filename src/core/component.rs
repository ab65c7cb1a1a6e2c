//! Component - a packaged unit of library artifacts exported downstream.

use serde::{Deserialize, Serialize};

/// A component declared by the recipe and checked at packaging time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Component name, unique within the package.
    pub name: String,

    /// Library names in link order (`gtest`, not `libgtest.a`).
    pub libs: Vec<String>,

    /// Name downstream build systems link against, e.g. `GTest::gtest`.
    pub exported_target_name: String,
}

impl Component {
    /// A component whose exported target defaults to `<package>::<name>`.
    pub fn new(package: &str, name: impl Into<String>, libs: Vec<String>) -> Self {
        let name = name.into();
        Component {
            exported_target_name: format!("{}::{}", package, name),
            name,
            libs,
        }
    }

    /// Override the exported target name.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.exported_target_name = target.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_target_name() {
        let component = Component::new("cpp-cli", "core", vec!["cli_core".into()]);
        assert_eq!(component.exported_target_name, "cpp-cli::core");

        let component = component.with_target("CppCli::core");
        assert_eq!(component.exported_target_name, "CppCli::core");
        assert_eq!(component.libs, vec!["cli_core".to_string()]);
    }
}
