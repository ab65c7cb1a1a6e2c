//! Resolution error types and diagnostics.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::sources::IndexError;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error during dependency resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum ResolveError {
    #[error("no version of `{package}` satisfies all requirements")]
    #[diagnostic(
        code(anvil::resolve::unsatisfiable),
        help("relax one of the conflicting requirements")
    )]
    UnsatisfiableConstraint {
        package: String,
        /// `(requirer, requirement)` pairs
        requirements: Vec<(String, String)>,
    },

    #[error("cyclic dependency: {}", .cycle.join(" -> "))]
    #[diagnostic(code(anvil::resolve::cycle))]
    CyclicDependency { cycle: Vec<String> },

    #[error("no version of `{package}` matches `{requirement}`")]
    #[diagnostic(code(anvil::resolve::no_matching_version))]
    NoMatchingVersion {
        package: String,
        requirement: String,
        available: Vec<String>,
    },

    #[error("package not found: `{package}`")]
    #[diagnostic(code(anvil::resolve::not_found))]
    PackageNotFound { package: String },

    #[error("package index error: {message}")]
    #[diagnostic(code(anvil::resolve::index))]
    Index { message: String },

    #[error("resolution did not settle after {passes} passes")]
    #[diagnostic(
        code(anvil::resolve::unsettled),
        help("requirements of the selected versions keep changing; pin the packages involved")
    )]
    Unsettled { passes: usize },
}

impl From<IndexError> for ResolveError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::UnknownPackage { name } => ResolveError::PackageNotFound { package: name },
            IndexError::NoMatchingVersion {
                name,
                constraint,
                available,
            } => ResolveError::NoMatchingVersion {
                package: name,
                requirement: constraint,
                available,
            },
            other @ IndexError::Invalid { .. } => ResolveError::Index {
                message: other.to_string(),
            },
        }
    }
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::UnsatisfiableConstraint {
                package,
                requirements,
            } => {
                let mut diag = Diagnostic::error(self.to_string());
                for (requirer, req) in requirements {
                    diag = diag.with_context(format!("`{}` requires {}", requirer, req));
                }
                diag.with_suggestion(format!(
                    "Relax the requirements on `{}` so their ranges overlap",
                    package
                ))
            }

            ResolveError::CyclicDependency { cycle } => Diagnostic::error("cyclic dependency")
                .with_context(format!("cycle: {}", cycle.join(" -> ")))
                .with_suggestion("Break the cycle by removing one of the requirements"),

            ResolveError::NoMatchingVersion {
                package,
                available,
                ..
            } => {
                let mut diag = Diagnostic::error(self.to_string());
                if !available.is_empty() {
                    diag = diag.with_context(format!("available versions: {}", available.join(", ")));
                }
                diag.with_suggestion(format!("Update your version requirement for `{}`", package))
            }

            ResolveError::PackageNotFound { package } => {
                Diagnostic::error(format!("could not find package `{}`", package))
                    .with_suggestion("Check that the package name is spelled correctly")
                    .with_suggestion(suggestions::CHECK_INDEX)
            }

            ResolveError::Index { .. } => {
                Diagnostic::error(self.to_string()).with_suggestion(suggestions::CHECK_INDEX)
            }

            ResolveError::Unsettled { .. } => Diagnostic::error(self.to_string())
                .with_suggestion("Pin the packages whose requirements change between versions"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsatisfiable_diagnostic() {
        let err = ResolveError::UnsatisfiableConstraint {
            package: "gtest".to_string(),
            requirements: vec![
                ("root".to_string(), "gtest<1.0".to_string()),
                ("mocklib".to_string(), "gtest>=2.0".to_string()),
            ],
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("no version of `gtest` satisfies"));
        assert!(output.contains("`root` requires gtest<1.0"));
        assert!(output.contains("`mocklib` requires gtest>=2.0"));
    }

    #[test]
    fn test_cycle_message() {
        let err = ResolveError::CyclicDependency {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "cyclic dependency: a -> b -> a");
    }

    #[test]
    fn test_from_index_error() {
        let err: ResolveError = IndexError::UnknownPackage { name: "zlib".into() }.into();
        assert_eq!(err, ResolveError::PackageNotFound { package: "zlib".into() });
    }
}
