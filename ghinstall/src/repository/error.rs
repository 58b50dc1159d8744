//! Error types for the staging repository.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type for staging repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur while staging archives.
#[derive(Debug)]
pub enum RepositoryError {
    /// Failed to create directory.
    CreateDirectoryFailed { path: PathBuf, source: io::Error },

    /// Failed to copy an archive into the repository.
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    /// Failed to write file.
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to remove the repository tree.
    RemoveFailed { path: PathBuf, source: io::Error },

    /// Archive path has no usable filename.
    InvalidArchive(PathBuf),
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::CreateDirectoryFailed { path, source } => {
                write!(
                    f,
                    "failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            RepositoryError::CopyFailed { from, to, source } => {
                write!(
                    f,
                    "failed to copy {} to {}: {}",
                    from.display(),
                    to.display(),
                    source
                )
            }
            RepositoryError::WriteFailed { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
            RepositoryError::RemoveFailed { path, source } => {
                write!(f, "failed to remove {}: {}", path.display(), source)
            }
            RepositoryError::InvalidArchive(path) => {
                write!(f, "invalid archive path: {}", path.display())
            }
        }
    }
}

impl std::error::Error for RepositoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RepositoryError::CreateDirectoryFailed { source, .. } => Some(source),
            RepositoryError::CopyFailed { source, .. } => Some(source),
            RepositoryError::WriteFailed { source, .. } => Some(source),
            RepositoryError::RemoveFailed { source, .. } => Some(source),
            RepositoryError::InvalidArchive(_) => None,
        }
    }
}
