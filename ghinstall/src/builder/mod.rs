//! Building distributable source archives.
//!
//! The [`PackageBuilder`] trait turns a package directory into a source
//! archive. [`RCmdBuilder`] drives `R CMD build`; tests substitute stubs.

mod args;
mod rcmd;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::package::PackageDescription;

pub use args::{effective_build_args, split_build_args, NO_BUILD_DOCS_FLAG};
pub use rcmd::{check_required_tools, RCmdBuilder};

/// Result type for build operations.
pub type BuildResult<T> = Result<T, BuildError>;

/// Errors raised while building an archive.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The build tool could not be started.
    #[error("failed to run '{tool}': {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The build tool ran and reported failure.
    #[error("build tool exited with {status}:\n{output}")]
    Failed { status: String, output: String },

    /// The build tool succeeded but no archive appeared.
    #[error("no source archive found in {0}")]
    ArchiveMissing(PathBuf),

    /// Output directory could not be prepared.
    #[error("failed to prepare {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Builds a source archive from a package directory.
pub trait PackageBuilder {
    /// Build `package_dir` into `out_dir` and return the archive path.
    ///
    /// # Arguments
    ///
    /// * `package_dir` - Directory holding the package's `DESCRIPTION`
    /// * `description` - The parsed manifest of that package
    /// * `out_dir` - Existing directory that receives the archive
    /// * `build_args` - Extra flags for the build tool
    fn build(
        &self,
        package_dir: &Path,
        description: &PackageDescription,
        out_dir: &Path,
        build_args: &[String],
    ) -> BuildResult<PathBuf>;
}

impl<T: PackageBuilder + ?Sized> PackageBuilder for &T {
    fn build(
        &self,
        package_dir: &Path,
        description: &PackageDescription,
        out_dir: &Path,
        build_args: &[String],
    ) -> BuildResult<PathBuf> {
        (**self).build(package_dir, description, out_dir, build_args)
    }
}
