//! Centralized package naming conventions.
//!
//! Source archives follow the host layout `{name}_{version}.tar.gz`. The
//! builder, the staging repository and the index all go through these
//! functions rather than formatting names themselves.

use super::PackageVersion;

/// Extension of a source package archive.
pub const SOURCE_ARCHIVE_EXTENSION: &str = ".tar.gz";

/// Generate the source archive filename for a package.
///
/// # Examples
///
/// ```
/// use ghinstall::package::{archive_filename, PackageVersion};
///
/// let version: PackageVersion = "1.0.0".parse().unwrap();
/// assert_eq!(archive_filename("pkg", &version), "pkg_1.0.0.tar.gz");
/// ```
pub fn archive_filename(name: &str, version: &PackageVersion) -> String {
    format!("{}_{}{}", name, version, SOURCE_ARCHIVE_EXTENSION)
}

/// Split a source archive filename into package name and version.
///
/// Returns `None` when the filename does not follow the
/// `{name}_{version}.tar.gz` layout.
///
/// # Examples
///
/// ```
/// use ghinstall::package::parse_archive_filename;
///
/// let (name, version) = parse_archive_filename("data.table_1.15-4.tar.gz").unwrap();
/// assert_eq!(name, "data.table");
/// assert_eq!(version.to_string(), "1.15-4");
///
/// assert!(parse_archive_filename("README.md").is_none());
/// ```
pub fn parse_archive_filename(filename: &str) -> Option<(String, PackageVersion)> {
    let stem = filename.strip_suffix(SOURCE_ARCHIVE_EXTENSION)?;
    let (name, version) = stem.rsplit_once('_')?;
    if name.is_empty() {
        return None;
    }
    let version = version.parse().ok()?;
    Some((name.to_string(), version))
}
