//! Ephemeral package repository.
//!
//! A staging repository is a throwaway directory laid out like a regular
//! package repository so the standard installer can resolve freshly built
//! archives alongside the user's normal sources:
//!
//! ```text
//! ghinstall-repo-XXXXXX/
//! └── src/
//!     └── contrib/
//!         ├── PACKAGES
//!         ├── PACKAGES.gz
//!         └── pkg_1.0.0.tar.gz
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use super::index::{write_index, IndexEntry};
use super::{RepositoryError, RepositoryResult};
use crate::package::{archive_filename, PackageDescription};

/// Path of the source-package area relative to the repository root.
pub const CONTRIB_PATH: &str = "src/contrib";

/// Prefix of the temporary repository directory name.
const REPO_DIR_PREFIX: &str = "ghinstall-repo-";

/// A temporary package repository.
///
/// The directory tree is removed when the value is dropped, or explicitly
/// with [`StagingRepository::close`]. All mutation goes through `&mut self`,
/// so index regeneration is never concurrent.
#[derive(Debug)]
pub struct StagingRepository {
    root: TempDir,
    entries: Vec<IndexEntry>,
}

impl StagingRepository {
    /// Create an empty repository inside `parent`.
    ///
    /// The `src/contrib` tree and an empty index are written immediately so
    /// the repository is valid even before the first insert.
    pub fn create_in(parent: &Path) -> RepositoryResult<Self> {
        fs::create_dir_all(parent).map_err(|e| RepositoryError::CreateDirectoryFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;

        let root = tempfile::Builder::new()
            .prefix(REPO_DIR_PREFIX)
            .tempdir_in(parent)
            .map_err(|e| RepositoryError::CreateDirectoryFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;

        let contrib = root.path().join(CONTRIB_PATH);
        fs::create_dir_all(&contrib).map_err(|e| RepositoryError::CreateDirectoryFailed {
            path: contrib.clone(),
            source: e,
        })?;

        let repo = Self {
            root,
            entries: Vec::new(),
        };
        repo.write_index()?;
        debug!(root = %repo.root().display(), "Created staging repository");
        Ok(repo)
    }

    /// Root directory of the repository.
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Directory holding the archives and index.
    pub fn contrib_dir(&self) -> PathBuf {
        self.root().join(CONTRIB_PATH)
    }

    /// `file://` URL of the repository root, as installers expect.
    pub fn url(&self) -> String {
        file_url(self.root())
    }

    /// Entries currently listed in the index.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Whether a package with this name has been staged.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Copy a built archive into the repository and regenerate the index.
    ///
    /// A previously staged archive for the same package name is replaced.
    ///
    /// # Returns
    ///
    /// The path of the copied archive inside the repository.
    pub fn insert(
        &mut self,
        archive: &Path,
        description: &PackageDescription,
    ) -> RepositoryResult<PathBuf> {
        if archive.file_name().is_none() {
            return Err(RepositoryError::InvalidArchive(archive.to_path_buf()));
        }
        // The installer looks archives up as `{Package}_{Version}.tar.gz`
        let filename = archive_filename(description.name(), description.version());

        let dest = self.contrib_dir().join(&filename);
        fs::copy(archive, &dest).map_err(|e| RepositoryError::CopyFailed {
            from: archive.to_path_buf(),
            to: dest.clone(),
            source: e,
        })?;

        let entry = IndexEntry::from_description(description, filename);
        if let Some(pos) = self.entries.iter().position(|e| e.name == entry.name) {
            let replaced = std::mem::replace(&mut self.entries[pos], entry);
            if replaced.archive != self.entries[pos].archive {
                let stale = self.contrib_dir().join(&replaced.archive);
                fs::remove_file(&stale).ok();
            }
        } else {
            self.entries.push(entry);
        }

        self.write_index()?;
        debug!(archive = %dest.display(), "Staged archive");
        Ok(dest)
    }

    /// Rewrite the index from the current entries.
    pub fn write_index(&self) -> RepositoryResult<()> {
        write_index(&self.contrib_dir(), &self.entries)
    }

    /// Remove the repository tree, reporting any failure.
    pub fn close(self) -> RepositoryResult<()> {
        let path = self.root().to_path_buf();
        self.root
            .close()
            .map_err(|e| RepositoryError::RemoveFailed { path, source: e })
    }
}

/// Convert a local path into a `file://` URL.
fn file_url(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    if text.starts_with('/') {
        format!("file://{}", text)
    } else {
        format!("file:///{}", text)
    }
}
