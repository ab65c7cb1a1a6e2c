//! Requirement - a package name plus a version constraint.
//!
//! Accepted spellings:
//!
//! - `gtest>=1.15.0`, `gtest >=1.10, <2`, `zlib ^1.3` (semver requirement)
//! - `gtest/1.15.0` (exact pin)
//! - `gtest/[>=1.10 <2]` (bracketed range, space or comma separated)
//! - `gtest` (any version)

use std::fmt;
use std::str::FromStr;

use semver::VersionReq;
use thiserror::Error;

/// Error parsing a requirement string.
#[derive(Debug, Error)]
pub enum RequirementError {
    #[error("invalid package name `{name}`: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("invalid version constraint `{constraint}` for `{name}`: {source}")]
    InvalidConstraint {
        name: String,
        constraint: String,
        #[source]
        source: semver::Error,
    },
}

/// A declared requirement on an external package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    name: String,
    req: VersionReq,
    text: String,
}

impl Requirement {
    /// Create a requirement from an already-parsed constraint.
    pub fn new(name: impl Into<String>, req: VersionReq) -> Result<Self, RequirementError> {
        let name = name.into();
        validate_package_name(&name)?;
        let text = if req == VersionReq::STAR {
            name.clone()
        } else {
            format!("{} {}", name, req)
        };
        Ok(Requirement { name, req, text })
    }

    /// The required package.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The version constraint.
    pub fn version_req(&self) -> &VersionReq {
        &self.req
    }

    /// The requirement as it was written.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl FromStr for Requirement {
    type Err = RequirementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();

        let (name, constraint) = if let Some((name, version)) = text.split_once('/') {
            let version = version.trim();
            let constraint = match version.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
                Some(range) => range
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join(", "),
                None => format!("={}", version),
            };
            (name.trim(), constraint)
        } else {
            let split = text
                .find(|c: char| "<>=^~*,".contains(c) || c.is_whitespace())
                .unwrap_or(text.len());
            (text[..split].trim(), text[split..].trim().to_string())
        };

        validate_package_name(name)?;

        let req = if constraint.is_empty() {
            VersionReq::STAR
        } else {
            VersionReq::parse(&constraint).map_err(|source| RequirementError::InvalidConstraint {
                name: name.to_string(),
                constraint: constraint.clone(),
                source,
            })?
        };

        Ok(Requirement {
            name: name.to_string(),
            req,
            text: text.to_string(),
        })
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Validate a package name: lowercase `[a-z0-9_-]`, at most 64 characters,
/// not starting with `-`.
pub fn validate_package_name(name: &str) -> Result<(), RequirementError> {
    let invalid = |reason| RequirementError::InvalidName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.len() > 64 {
        return Err(invalid("name is longer than 64 characters"));
    }
    if name.starts_with('-') {
        return Err(invalid("name starts with `-`"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        return Err(invalid("only lowercase letters, digits, `_` and `-` are allowed"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use semver::Version;

    #[test]
    fn test_parse_operator_form() {
        let req: Requirement = "gtest>=1.15.0".parse().unwrap();
        assert_eq!(req.name(), "gtest");
        assert!(req.version_req().matches(&Version::new(1, 15, 0)));
        assert!(req.version_req().matches(&Version::new(2, 0, 0)));
        assert!(!req.version_req().matches(&Version::new(1, 14, 9)));
        assert_eq!(req.to_string(), "gtest>=1.15.0");
    }

    #[test]
    fn test_parse_spaced_and_compound() {
        let req: Requirement = "gtest >=1.10, <2".parse().unwrap();
        assert_eq!(req.name(), "gtest");
        assert!(req.version_req().matches(&Version::new(1, 12, 0)));
        assert!(!req.version_req().matches(&Version::new(2, 0, 0)));
    }

    #[test]
    fn test_parse_pinned_reference() {
        let req: Requirement = "gtest/1.15.0".parse().unwrap();
        assert!(req.version_req().matches(&Version::new(1, 15, 0)));
        assert!(!req.version_req().matches(&Version::new(1, 15, 1)));
    }

    #[test]
    fn test_parse_bracketed_range() {
        let req: Requirement = "zlib/[>=1.2 <2]".parse().unwrap();
        assert_eq!(req.name(), "zlib");
        assert!(req.version_req().matches(&Version::new(1, 3, 1)));
        assert!(!req.version_req().matches(&Version::new(2, 0, 0)));
    }

    #[test]
    fn test_parse_bare_name() {
        let req: Requirement = "fmt".parse().unwrap();
        assert_eq!(req.version_req(), &VersionReq::STAR);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            "GTest>=1.0".parse::<Requirement>(),
            Err(RequirementError::InvalidName { .. })
        ));
        assert!(matches!(
            ">=1.0".parse::<Requirement>(),
            Err(RequirementError::InvalidName { .. })
        ));
        assert!(matches!(
            "gtest>=banana".parse::<Requirement>(),
            Err(RequirementError::InvalidConstraint { .. })
        ));
    }

    #[test]
    fn test_new_renders_text() {
        let req = Requirement::new("zlib", "^1.3".parse().unwrap()).unwrap();
        assert_eq!(req.text(), "zlib ^1.3");
    }
}
