//! Fetching working copies of source repositories.
//!
//! The [`SourceFetcher`] trait is the seam between the installer and the
//! version-control client. [`GitFetcher`] is the production implementation
//! backed by libgit2; tests substitute stubs.

mod credentials;
mod git;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::reference::Reference;

pub use credentials::Credentials;
pub use git::GitFetcher;

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors raised by a fetcher.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The version-control library reported an error (network, auth, ...).
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// The requested commit, tag or pull request does not exist.
    #[error("revision '{0}' not found")]
    RevisionNotFound(String),

    /// Destination directory could not be prepared.
    #[error("failed to prepare {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other collaborator-specific failure.
    #[error("{0}")]
    Other(String),
}

/// A checked-out working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingCopy {
    /// Root of the checkout.
    pub path: PathBuf,

    /// Commit id that was checked out.
    pub commit: String,
}

impl WorkingCopy {
    pub fn new(path: impl Into<PathBuf>, commit: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            commit: commit.into(),
        }
    }

    /// Short form of the commit id for messages.
    pub fn short_commit(&self) -> &str {
        let end = self.commit.len().min(7);
        &self.commit[..end]
    }
}

/// Produces a local working copy for a reference.
///
/// Implementations must check out the snapshot named by the reference's
/// selector into `dest`, which does not exist yet or is empty. The caller
/// owns `dest` and removes it.
pub trait SourceFetcher {
    fn fetch(&self, reference: &Reference, dest: &Path) -> FetchResult<WorkingCopy>;
}

impl<T: SourceFetcher + ?Sized> SourceFetcher for &T {
    fn fetch(&self, reference: &Reference, dest: &Path) -> FetchResult<WorkingCopy> {
        (**self).fetch(reference, dest)
    }
}
