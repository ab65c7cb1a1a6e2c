//! Version constraints as ranges.
//!
//! Constraints are kept as `pubgrub` ranges so that intersecting several
//! requirements on one package is exact, and an empty intersection is
//! detectable without enumerating versions.

use std::fmt;

use pubgrub::Range;
use semver::{Comparator, Op, Version, VersionReq};

use crate::core::Requirement;

/// The set of versions acceptable for one package, with the requirements it
/// was built from.
#[derive(Debug, Clone)]
pub struct Constraint {
    range: Range<Version>,
    sources: Vec<(String, String)>,
}

impl Constraint {
    /// Any version.
    pub fn any() -> Self {
        Constraint {
            range: Range::full(),
            sources: Vec::new(),
        }
    }

    /// The constraint expressed by a semver requirement.
    pub fn from_req(req: &VersionReq) -> Self {
        Constraint {
            range: version_req_to_range(req),
            sources: Vec::new(),
        }
    }

    /// The constraint `requirer` places through `req`.
    pub fn from_requirement(req: &Requirement, requirer: &str) -> Self {
        Constraint {
            range: version_req_to_range(req.version_req()),
            sources: vec![(requirer.to_string(), req.text().to_string())],
        }
    }

    /// Versions acceptable to both constraints.
    pub fn intersect(&self, other: &Constraint) -> Constraint {
        let mut sources = self.sources.clone();
        for source in &other.sources {
            if !sources.contains(source) {
                sources.push(source.clone());
            }
        }

        Constraint {
            range: self.range.intersection(&other.range),
            sources,
        }
    }

    /// Whether no version satisfies the constraint.
    pub fn is_empty(&self) -> bool {
        self.range == Range::empty()
    }

    pub fn contains(&self, version: &Version) -> bool {
        self.range.contains(version)
    }

    /// `(requirer, requirement text)` pairs that produced this constraint.
    pub fn sources(&self) -> &[(String, String)] {
        &self.sources
    }
}

/// Constraints compare by the versions they admit, not by provenance.
impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.range == other.range
    }
}

impl Eq for Constraint {}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.range)
    }
}

/// Convert a semver requirement to a range. Comparators are ANDed.
pub fn version_req_to_range(req: &VersionReq) -> Range<Version> {
    req.comparators
        .iter()
        .fold(Range::full(), |range, comp| range.intersection(&comparator_to_range(comp)))
}

/// Convert a single comparator, honouring partial versions the way semver
/// does (`>1` means `>=2.0.0`, `<=1.2` means `<1.3.0`).
fn comparator_to_range(comp: &Comparator) -> Range<Version> {
    let major = comp.major;
    let minor = comp.minor.unwrap_or(0);
    let patch = comp.patch.unwrap_or(0);
    let version = Version::new(major, minor, patch);

    // First version past the precision the comparator was written with.
    // `None` when no such version exists (components at `u64::MAX`).
    let next = match (comp.minor, comp.patch) {
        (None, _) => next_major(major),
        (Some(_), None) => next_minor(major, minor),
        (Some(_), Some(_)) => next_patch(major, minor, patch),
    };

    match comp.op {
        Op::Exact | Op::Wildcard => at_least_below(version, next),

        Op::Greater => match next {
            Some(next) => Range::higher_than(next),
            None => Range::empty(),
        },

        Op::GreaterEq => Range::higher_than(version),

        Op::Less => Range::strictly_lower_than(version),

        Op::LessEq => match next {
            Some(next) => Range::strictly_lower_than(next),
            None => Range::full(),
        },

        Op::Tilde => {
            // ~1.2.3 := >=1.2.3 <1.3.0, ~1 := >=1.0.0 <2.0.0
            let upper = if comp.minor.is_some() {
                next_minor(major, minor)
            } else {
                next_major(major)
            };
            at_least_below(version, upper)
        }

        Op::Caret => {
            // The left-most non-zero component may not change.
            let upper = if major > 0 || comp.minor.is_none() {
                next_major(major)
            } else if minor > 0 || comp.patch.is_none() {
                next_minor(0, minor)
            } else {
                next_patch(0, 0, patch)
            };
            at_least_below(version, upper)
        }

        _ => Range::full(),
    }
}

/// `[low, high)`, or `[low, ..)` when there is no upper bound.
fn at_least_below(low: Version, high: Option<Version>) -> Range<Version> {
    match high {
        Some(high) => Range::between(low, high),
        None => Range::higher_than(low),
    }
}

fn next_major(major: u64) -> Option<Version> {
    major.checked_add(1).map(|m| Version::new(m, 0, 0))
}

fn next_minor(major: u64, minor: u64) -> Option<Version> {
    match minor.checked_add(1) {
        Some(m) => Some(Version::new(major, m, 0)),
        None => next_major(major),
    }
}

fn next_patch(major: u64, minor: u64, patch: u64) -> Option<Version> {
    match patch.checked_add(1) {
        Some(p) => Some(Version::new(major, minor, p)),
        None => next_minor(major, minor),
    }
}

/// Parse a version string, filling in missing minor/patch components.
pub fn parse_version_lenient(s: &str) -> Option<Version> {
    let s = s.trim();
    if let Ok(v) = s.parse() {
        return Some(v);
    }

    let parts: Vec<&str> = s.split('.').collect();
    match parts.as_slice() {
        [major] => Some(Version::new(major.parse().ok()?, 0, 0)),
        [major, minor] => Some(Version::new(major.parse().ok()?, minor.parse().ok()?, 0)),
        _ => None,
    }
}
