//! Package version type with host ordering rules.
//!
//! R package versions are sequences of non-negative integers separated by
//! `.` or `-` (e.g. `1.0.0`, `0.9-2`, `1.2.3.9000`). They are not semantic
//! versions.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error returned when a version string is not a valid package version.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid package version '{0}'")]
pub struct VersionParseError(pub String);

/// A package version.
///
/// Ordering compares components numerically from left to right. When one
/// version is a prefix of the other, the shorter one is smaller, so
/// `1.0 < 1.0.0 < 1.0.1`.
///
/// The original text is kept for display, so `0.9-2` prints as `0.9-2`.
///
/// # Example
///
/// ```
/// use ghinstall::package::PackageVersion;
///
/// let old: PackageVersion = "0.9-2".parse().unwrap();
/// let new: PackageVersion = "0.10.0".parse().unwrap();
///
/// assert!(old < new);
/// assert_eq!(old.to_string(), "0.9-2");
/// ```
#[derive(Debug, Clone)]
pub struct PackageVersion {
    raw: String,
    components: Vec<u64>,
}

impl PackageVersion {
    /// Parse a version string.
    ///
    /// At least two components are required, matching what the host
    /// accepts in a `Version:` field.
    pub fn parse(input: &str) -> Result<Self, VersionParseError> {
        let raw = input.trim();
        let components = raw
            .split(['.', '-'])
            .map(|part| part.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| VersionParseError(input.to_string()))?;

        if components.len() < 2 {
            return Err(VersionParseError(input.to_string()));
        }

        Ok(Self {
            raw: raw.to_string(),
            components,
        })
    }

    /// Numeric components in order.
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// The version exactly as written in the manifest.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for PackageVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components
    }
}

impl Eq for PackageVersion {}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components.cmp(&other.components)
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for PackageVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}
