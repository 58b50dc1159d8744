//! Error types for the installer.

use std::io;
use std::path::PathBuf;

use crate::builder::BuildError;
use crate::fetcher::FetchError;
use crate::reference::ReferenceError;
use crate::repository::RepositoryError;
use crate::runtime::RuntimeError;

/// Result type for installer operations.
pub type InstallResult<T> = Result<T, InstallError>;

/// Fatal errors that abort an install call.
///
/// Scratch directories are removed before any of these reaches the caller.
#[derive(Debug)]
pub enum InstallError {
    /// An input string is not a valid reference.
    InvalidReference(ReferenceError),

    /// The working copy could not be fetched.
    FetchFailed {
        reference: String,
        source: FetchError,
    },

    /// The package root or its manifest could not be read.
    ManifestFailed { reference: String, reason: String },

    /// The archive build failed.
    BuildFailed {
        reference: String,
        source: BuildError,
    },

    /// Writing the staging repository failed.
    StagingFailed(RepositoryError),

    /// The batched install command failed.
    InstallFailed(RuntimeError),

    /// Failed to create a scratch directory.
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// Nothing was requested.
    NoReferences,
}

impl std::fmt::Display for InstallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidReference(e) => write!(f, "{}", e),
            Self::FetchFailed { reference, source } => {
                write!(f, "failed to fetch '{}': {}", reference, source)
            }
            Self::ManifestFailed { reference, reason } => {
                write!(f, "failed to read manifest of '{}': {}", reference, reason)
            }
            Self::BuildFailed { reference, source } => {
                write!(f, "failed to build '{}': {}", reference, source)
            }
            Self::StagingFailed(e) => write!(f, "failed to stage archive: {}", e),
            Self::InstallFailed(e) => write!(f, "installation failed: {}", e),
            Self::CreateDirFailed { path, source } => {
                write!(
                    f,
                    "failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::NoReferences => write!(f, "no package references given"),
        }
    }
}

impl std::error::Error for InstallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidReference(e) => Some(e),
            Self::FetchFailed { source, .. } => Some(source),
            Self::BuildFailed { source, .. } => Some(source),
            Self::StagingFailed(e) => Some(e),
            Self::InstallFailed(e) => Some(e),
            Self::CreateDirFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ReferenceError> for InstallError {
    fn from(e: ReferenceError) -> Self {
        Self::InvalidReference(e)
    }
}

impl From<RepositoryError> for InstallError {
    fn from(e: RepositoryError) -> Self {
        Self::StagingFailed(e)
    }
}
