//! Local staging repository for built archives.
//!
//! Freshly built source archives are inserted into a temporary directory
//! following the standard package-repository layout, so the host installer
//! can treat it like any other repository and resolve dependencies across
//! it and the user's configured sources in one pass.

mod error;
mod index;
mod staging;

pub use error::{RepositoryError, RepositoryResult};
pub use index::{
    read_index, serialize_index, write_index, IndexEntry, INDEX_FILENAME, INDEX_GZ_FILENAME,
};
pub use staging::{StagingRepository, CONTRIB_PATH};
