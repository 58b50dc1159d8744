//! `Rscript`-backed host runtime.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::OnceLock;

use tracing::{debug, warn};

use super::expr::{install_packages_call, lib_paths_call, remove_packages_call};
use super::{InstallRequest, PackageRuntime, RuntimeError, RuntimeResult};
use crate::package::{PackageDescription, PackageVersion};

/// Default host script runner.
const DEFAULT_RSCRIPT: &str = "Rscript";

/// Runs host commands through `Rscript -e`.
///
/// Installed versions are read straight from `<library>/<name>/DESCRIPTION`
/// rather than by starting a session per lookup. The library search path is
/// asked from the host once and cached.
///
/// Every `Rscript` invocation is a fresh session, so from this process's
/// point of view no package is ever loaded: `is_loaded` is always false and
/// `unload`/`reload` do nothing.
#[derive(Debug)]
pub struct RscriptRuntime {
    rscript: PathBuf,
    lib_paths: OnceLock<Vec<PathBuf>>,
}

impl Default for RscriptRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl RscriptRuntime {
    /// Runtime using `Rscript` from `PATH`.
    pub fn new() -> Self {
        Self::with_command(DEFAULT_RSCRIPT)
    }

    /// Runtime using a specific `Rscript` executable.
    pub fn with_command(rscript: impl Into<PathBuf>) -> Self {
        Self {
            rscript: rscript.into(),
            lib_paths: OnceLock::new(),
        }
    }

    pub fn command(&self) -> &Path {
        &self.rscript
    }

    /// Run one expression and fail on a non-zero exit.
    fn run(&self, action: &str, expr: &str) -> RuntimeResult<Output> {
        debug!(action, expr, "Running Rscript");
        let output = Command::new(&self.rscript)
            .arg("-e")
            .arg(expr)
            .output()
            .map_err(|e| RuntimeError::Spawn {
                command: self.rscript.display().to_string(),
                source: e,
            })?;

        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RuntimeError::CommandFailed {
                action: action.to_string(),
                status: output.status.to_string(),
                output: format!("{}{}", stdout, stderr).trim().to_string(),
            });
        }

        Ok(output)
    }

    /// The host's library search path, queried once.
    ///
    /// An unreachable host yields an empty path list.
    pub fn default_lib_paths(&self) -> &[PathBuf] {
        self.lib_paths.get_or_init(|| match self.run("libPaths", lib_paths_call()) {
            Ok(output) => String::from_utf8_lossy(&output.stdout)
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(PathBuf::from)
                .collect(),
            Err(e) => {
                warn!(error = %e, "Could not determine library search path");
                Vec::new()
            }
        })
    }
}

/// Read the version of `name` installed in `library`, if any.
pub(crate) fn version_in_library(library: &Path, name: &str) -> Option<PackageVersion> {
    let package_dir = library.join(name);
    if !package_dir.is_dir() {
        return None;
    }
    match PackageDescription::read_from_dir(&package_dir) {
        Ok(desc) if desc.name() == name => Some(desc.version().clone()),
        Ok(desc) => {
            debug!(
                expected = name,
                found = desc.name(),
                "Library entry does not match package name"
            );
            None
        }
        Err(e) => {
            debug!(package = name, error = %e, "Unreadable installed manifest");
            None
        }
    }
}

impl PackageRuntime for RscriptRuntime {
    fn installed_version(&self, name: &str, library: Option<&Path>) -> Option<PackageVersion> {
        match library {
            Some(lib) => version_in_library(lib, name),
            None => self
                .default_lib_paths()
                .iter()
                .find_map(|lib| version_in_library(lib, name)),
        }
    }

    fn is_loaded(&self, _name: &str) -> bool {
        false
    }

    fn unload(&self, name: &str) -> RuntimeResult<()> {
        debug!(package = name, "Nothing to unload in a fresh session");
        Ok(())
    }

    fn reload(&self, name: &str) -> RuntimeResult<()> {
        debug!(package = name, "Nothing to reload in a fresh session");
        Ok(())
    }

    fn uninstall(&self, name: &str, library: Option<&Path>) -> RuntimeResult<()> {
        self.run("remove.packages", &remove_packages_call(name, library))
            .map(|_| ())
    }

    fn install_batch(&self, request: &InstallRequest) -> RuntimeResult<()> {
        self.run("install.packages", &install_packages_call(request))
            .map(|_| ())
    }
}
