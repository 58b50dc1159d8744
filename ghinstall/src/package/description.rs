//! Package manifest (`DESCRIPTION`) parsing.
//!
//! The [`PackageDescription`] struct holds the identity of a fetched package
//! along with the remaining manifest fields, which the staging repository
//! copies into its index.

use std::fmt;
use std::fs;
use std::path::Path;

use thiserror::Error;

use super::dcf::{parse_dcf, DcfError, DcfRecord};
use super::version::{PackageVersion, VersionParseError};

/// Manifest filename at the root of every package.
pub const DESCRIPTION_FILENAME: &str = "DESCRIPTION";

/// Errors that can occur while reading a manifest.
#[derive(Debug, Error)]
pub enum DescriptionError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manifest: {0}")]
    Format(#[from] DcfError),

    #[error("manifest is empty")]
    Empty,

    #[error("manifest is missing required field '{0}'")]
    MissingField(&'static str),

    #[error(transparent)]
    Version(#[from] VersionParseError),
}

/// A parsed package manifest.
///
/// # Example
///
/// ```
/// use ghinstall::package::PackageDescription;
///
/// let desc = PackageDescription::parse("Package: demo\nVersion: 0.2-1\n").unwrap();
///
/// assert_eq!(desc.name(), "demo");
/// assert_eq!(desc.version().to_string(), "0.2-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescription {
    name: String,
    version: PackageVersion,
    record: DcfRecord,
}

impl PackageDescription {
    /// Parse manifest text.
    pub fn parse(content: &str) -> Result<Self, DescriptionError> {
        let record = parse_dcf(content)?
            .into_iter()
            .next()
            .ok_or(DescriptionError::Empty)?;
        Self::from_record(record)
    }

    /// Build a description from an already-parsed DCF record.
    pub fn from_record(record: DcfRecord) -> Result<Self, DescriptionError> {
        let name = record
            .get("Package")
            .filter(|n| !n.is_empty())
            .ok_or(DescriptionError::MissingField("Package"))?
            .to_string();
        let version = record
            .get("Version")
            .ok_or(DescriptionError::MissingField("Version"))?
            .parse::<PackageVersion>()?;

        Ok(Self {
            name,
            version,
            record,
        })
    }

    /// Read `DESCRIPTION` from a package directory.
    pub fn read_from_dir(package_dir: &Path) -> Result<Self, DescriptionError> {
        let path = package_dir.join(DESCRIPTION_FILENAME);
        let content = fs::read_to_string(&path).map_err(|e| DescriptionError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Package name (`Package` field).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package version (`Version` field).
    pub fn version(&self) -> &PackageVersion {
        &self.version
    }

    /// Look up any other manifest field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.record.get(name)
    }

    /// The full underlying record.
    pub fn record(&self) -> &DcfRecord {
        &self.record
    }
}

impl fmt::Display for PackageDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}
