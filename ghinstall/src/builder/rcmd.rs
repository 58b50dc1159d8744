//! `R CMD build` driver.
//!
//! Runs the host build tool in the output directory, where it drops
//! `{name}_{version}.tar.gz`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use super::{BuildError, BuildResult, PackageBuilder};
use crate::package::{
    archive_filename, parse_archive_filename, PackageDescription, SOURCE_ARCHIVE_EXTENSION,
};

/// Default build tool executable.
const DEFAULT_R_COMMAND: &str = "R";

/// Builds source archives with `R CMD build`.
#[derive(Debug, Clone)]
pub struct RCmdBuilder {
    r_command: PathBuf,
}

impl Default for RCmdBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RCmdBuilder {
    /// Builder using `R` from `PATH`.
    pub fn new() -> Self {
        Self {
            r_command: PathBuf::from(DEFAULT_R_COMMAND),
        }
    }

    /// Builder using a specific `R` executable.
    pub fn with_command(r_command: impl Into<PathBuf>) -> Self {
        Self {
            r_command: r_command.into(),
        }
    }

    pub fn command(&self) -> &Path {
        &self.r_command
    }

    /// Check that the build tool can be started.
    pub fn check_available(&self) -> BuildResult<()> {
        check_required_tools([&self.r_command])
    }
}

impl PackageBuilder for RCmdBuilder {
    fn build(
        &self,
        package_dir: &Path,
        description: &PackageDescription,
        out_dir: &Path,
        build_args: &[String],
    ) -> BuildResult<PathBuf> {
        fs::create_dir_all(out_dir).map_err(|e| BuildError::Io {
            path: out_dir.to_path_buf(),
            source: e,
        })?;

        debug!(
            package = description.name(),
            dir = %package_dir.display(),
            args = ?build_args,
            "Running R CMD build"
        );

        let output = Command::new(&self.r_command)
            .current_dir(out_dir)
            .arg("CMD")
            .arg("build")
            .args(build_args)
            .arg(package_dir)
            .output()
            .map_err(|e| BuildError::Spawn {
                tool: self.r_command.display().to_string(),
                source: e,
            })?;

        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BuildError::Failed {
                status: output.status.to_string(),
                output: format!("{}{}", stdout, stderr).trim().to_string(),
            });
        }

        find_archive(out_dir, description)
    }
}

/// Locate the archive the build tool produced.
///
/// Looks for the conventional filename first, then for an archive of the
/// same package whose version is spelled differently (`1.0-1` for `1.0.1`).
/// Archives of other packages or versions are never picked up.
fn find_archive(out_dir: &Path, description: &PackageDescription) -> BuildResult<PathBuf> {
    let expected = out_dir.join(archive_filename(description.name(), description.version()));
    if expected.is_file() {
        return Ok(expected);
    }

    let pattern = out_dir
        .join(format!("{}_*{}", description.name(), SOURCE_ARCHIVE_EXTENSION))
        .to_string_lossy()
        .into_owned();
    glob::glob(&pattern)
        .ok()
        .into_iter()
        .flatten()
        .filter_map(Result::ok)
        .filter(|path| path.is_file())
        .find(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .and_then(parse_archive_filename)
                .is_some_and(|(name, version)| {
                    name == description.name() && &version == description.version()
                })
        })
        .ok_or_else(|| BuildError::ArchiveMissing(out_dir.to_path_buf()))
}

/// Check that the host tools can be started.
///
/// # Arguments
///
/// * `commands` - Executables to probe with `--version`
pub fn check_required_tools<I, P>(commands: I) -> BuildResult<()>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    for command in commands {
        let command = command.as_ref();
        let result = Command::new(command).arg("--version").output();

        match result {
            Ok(output) if output.status.success() => {}
            Ok(output) => {
                return Err(BuildError::Failed {
                    status: output.status.to_string(),
                    output: format!(
                        "'{}' command failed. Please ensure it is properly installed.",
                        command.display()
                    ),
                })
            }
            Err(e) => {
                return Err(BuildError::Spawn {
                    tool: command.display().to_string(),
                    source: e,
                })
            }
        }
    }
    Ok(())
}
