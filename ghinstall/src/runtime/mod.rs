//! Host runtime interface.
//!
//! The host owns two pieces of global state this crate reads and changes:
//! the set of packages loaded in the running session and the set of
//! installed packages. [`PackageRuntime`] is the query/command interface
//! over both, so the installer can run against a stub in tests.

mod expr;
mod rscript;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::package::PackageVersion;

pub use expr::{install_packages_call, r_string, r_string_vector, remove_packages_call};
pub use rscript::RscriptRuntime;

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors raised by the host runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The host executable could not be started.
    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A host command ran and reported failure.
    #[error("'{action}' failed ({status}):\n{output}")]
    CommandFailed {
        action: String,
        status: String,
        output: String,
    },

    /// Any other runtime-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Category of declared dependency to install alongside a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DependencyKind {
    Depends,
    Imports,
    LinkingTo,
    Suggests,
    Enhances,
}

impl DependencyKind {
    /// Every kind, in manifest order.
    pub const ALL: [DependencyKind; 5] = [
        DependencyKind::Depends,
        DependencyKind::Imports,
        DependencyKind::LinkingTo,
        DependencyKind::Suggests,
        DependencyKind::Enhances,
    ];

    /// The kinds installed when the caller does not choose.
    pub fn defaults() -> Vec<DependencyKind> {
        vec![DependencyKind::Depends, DependencyKind::Imports]
    }

    /// Manifest field name for this kind.
    pub fn field_name(&self) -> &'static str {
        match self {
            DependencyKind::Depends => "Depends",
            DependencyKind::Imports => "Imports",
            DependencyKind::LinkingTo => "LinkingTo",
            DependencyKind::Suggests => "Suggests",
            DependencyKind::Enhances => "Enhances",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

impl FromStr for DependencyKind {
    type Err = String;

    /// Case-insensitive match on the manifest field name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DependencyKind::ALL
            .into_iter()
            .find(|kind| kind.field_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown dependency kind '{}'", wanted))
    }
}

/// Everything the single batched install call needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    /// Package names to install, in request order.
    pub packages: Vec<String>,

    /// Repository URLs searched in order; the staging repository comes first.
    pub repos: Vec<String>,

    /// Target library, or the host default when `None`.
    pub library: Option<PathBuf>,

    /// Dependency categories to install as well.
    pub dependencies: Vec<DependencyKind>,

    /// Installer `type` argument, passed through when set.
    pub install_type: Option<String>,

    /// Extra installer arguments, passed through verbatim.
    pub extra_options: Vec<String>,
}

/// Query/command interface over the host's loaded and installed packages.
pub trait PackageRuntime {
    /// Installed version of a package, or `None` when absent or unreadable.
    ///
    /// Looks only in `library` when given, otherwise in the default search
    /// path.
    fn installed_version(&self, name: &str, library: Option<&Path>) -> Option<PackageVersion>;

    /// Whether the package is loaded in the running session.
    fn is_loaded(&self, name: &str) -> bool;

    /// Unload a loaded package.
    fn unload(&self, name: &str) -> RuntimeResult<()>;

    /// Load a package again after reinstalling it.
    fn reload(&self, name: &str) -> RuntimeResult<()>;

    /// Remove an installed package.
    fn uninstall(&self, name: &str, library: Option<&Path>) -> RuntimeResult<()>;

    /// Install all requested packages in one call.
    fn install_batch(&self, request: &InstallRequest) -> RuntimeResult<()>;
}

impl<T: PackageRuntime + ?Sized> PackageRuntime for &T {
    fn installed_version(&self, name: &str, library: Option<&Path>) -> Option<PackageVersion> {
        (**self).installed_version(name, library)
    }

    fn is_loaded(&self, name: &str) -> bool {
        (**self).is_loaded(name)
    }

    fn unload(&self, name: &str) -> RuntimeResult<()> {
        (**self).unload(name)
    }

    fn reload(&self, name: &str) -> RuntimeResult<()> {
        (**self).reload(name)
    }

    fn uninstall(&self, name: &str, library: Option<&Path>) -> RuntimeResult<()> {
        (**self).uninstall(name, library)
    }

    fn install_batch(&self, request: &InstallRequest) -> RuntimeResult<()> {
        (**self).install_batch(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dependency_kinds() {
        assert_eq!(
            DependencyKind::defaults(),
            vec![DependencyKind::Depends, DependencyKind::Imports]
        );
    }

    #[test]
    fn test_dependency_kind_from_str() {
        assert_eq!("imports".parse(), Ok(DependencyKind::Imports));
        assert_eq!(" LinkingTo ".parse(), Ok(DependencyKind::LinkingTo));
        assert!("Recommends".parse::<DependencyKind>().is_err());
    }

    #[test]
    fn test_dependency_kind_display() {
        assert_eq!(DependencyKind::Suggests.to_string(), "Suggests");
    }
}
