//! Outcome of an install call.

use std::fmt;

use serde::Serialize;

use crate::package::PackageVersion;

/// Installed version of one requested package after the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledVersion {
    pub name: String,

    /// `None` when the package could not be found after installing.
    pub version: Option<PackageVersion>,
}

/// A problem that did not abort the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InstallWarning {
    /// The installed version is newer than the one being installed.
    VersionRegression {
        package: String,
        installed: PackageVersion,
        fetched: PackageVersion,
    },

    /// Removing the existing install before reinstalling failed.
    UninstallFailed { package: String, reason: String },

    /// A loaded package could not be unloaded.
    UnloadFailed { package: String, reason: String },

    /// A package unloaded for the install could not be loaded again.
    ReloadFailed { package: String, reason: String },

    /// Two references produced the same package; the later one won.
    DuplicatePackage {
        package: String,
        references: Vec<String>,
    },
}

impl InstallWarning {
    /// Package the warning is about.
    pub fn package(&self) -> &str {
        match self {
            Self::VersionRegression { package, .. }
            | Self::UninstallFailed { package, .. }
            | Self::UnloadFailed { package, .. }
            | Self::ReloadFailed { package, .. }
            | Self::DuplicatePackage { package, .. } => package,
        }
    }
}

impl fmt::Display for InstallWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VersionRegression {
                package,
                installed,
                fetched,
            } => write!(
                f,
                "{}: installed version {} is newer than {} being installed",
                package, installed, fetched
            ),
            Self::UninstallFailed { package, reason } => {
                write!(f, "{}: uninstall failed: {}", package, reason)
            }
            Self::UnloadFailed { package, reason } => {
                write!(f, "{}: unload failed: {}", package, reason)
            }
            Self::ReloadFailed { package, reason } => {
                write!(f, "{}: reload failed: {}", package, reason)
            }
            Self::DuplicatePackage {
                package,
                references,
            } => write!(
                f,
                "{}: provided by {}; using the last one",
                package,
                references.join(", ")
            ),
        }
    }
}

/// Result of a successful install call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    /// Requested packages in order of first request.
    pub installed: Vec<InstalledVersion>,

    /// Non-fatal problems, in the order they happened.
    pub warnings: Vec<InstallWarning>,
}

impl InstallReport {
    /// Version of a requested package, if it is installed now.
    pub fn version_of(&self, name: &str) -> Option<&PackageVersion> {
        self.installed
            .iter()
            .find(|entry| entry.name == name)
            .and_then(|entry| entry.version.as_ref())
    }

    /// Whether the package was part of the request.
    pub fn contains(&self, name: &str) -> bool {
        self.installed.iter().any(|entry| entry.name == name)
    }

    /// Requested package names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.installed.iter().map(|entry| entry.name.as_str())
    }
}
