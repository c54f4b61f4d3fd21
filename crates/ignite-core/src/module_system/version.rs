use std::fmt;
use std::str::FromStr;

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

/// Error type for version parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("Invalid version constraint '{constraint}': {message}")]
    InvalidConstraint { constraint: String, message: String },
    #[error("Invalid version '{version}': {message}")]
    InvalidVersion { version: String, message: String },
}

/// Parses a plain semantic version such as `1.2.3`.
pub fn parse_version(version: &str) -> Result<Version, VersionError> {
    Version::parse(version.trim()).map_err(|e| VersionError::InvalidVersion {
        version: version.to_string(),
        message: e.to_string(),
    })
}

/// Represents a version requirement range using semver constraints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionRange {
    /// The original constraint string (e.g., "^1.2.3", ">=2.0")
    constraint: String,
    /// The parsed semver requirement
    req: VersionReq,
}

impl VersionRange {
    /// Creates a new version range from a constraint string.
    pub fn from_constraint(constraint: &str) -> Result<Self, VersionError> {
        let req = VersionReq::parse(constraint).map_err(|e| VersionError::InvalidConstraint {
            constraint: constraint.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            constraint: constraint.to_string(),
            req,
        })
    }

    /// Checks if a specific `semver::Version` satisfies this range.
    pub fn includes(&self, version: &Version) -> bool {
        self.req.matches(version)
    }

    /// Returns the original constraint string.
    pub fn constraint_string(&self) -> &str {
        &self.constraint
    }
}

impl PartialEq for VersionRange {
    fn eq(&self, other: &Self) -> bool {
        self.req == other.req
    }
}

impl Eq for VersionRange {}

/// Implement Display to show the original constraint string.
impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.constraint)
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_constraint(s)
    }
}

impl TryFrom<String> for VersionRange {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_constraint(&value)
    }
}

impl From<VersionRange> for String {
    fn from(range: VersionRange) -> Self {
        range.constraint
    }
}
