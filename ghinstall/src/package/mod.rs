//! Package manifest types and parsing.
//!
//! This module provides the data structures for a fetched package: its
//! manifest, its version, and the naming of the source archive built from it.
//!
//! # Overview
//!
//! - **PackageDescription**: the `DESCRIPTION` manifest (name, version, other fields)
//! - **PackageVersion**: host-style version with numeric ordering
//! - **DCF**: the `Field: value` text format shared by manifests and repository indexes
//! - **Naming**: `{name}_{version}.tar.gz` archive filenames
//!
//! # File Formats
//!
//! ```text
//! Package: pkg
//! Version: 1.0.0
//! Imports:
//!     jsonlite,
//!     rlang (>= 1.0.0)
//! ```

mod dcf;
mod description;
mod naming;
mod version;

pub use dcf::{parse_dcf, serialize_dcf, DcfError, DcfRecord};
pub use description::{DescriptionError, PackageDescription, DESCRIPTION_FILENAME};
pub use naming::{archive_filename, parse_archive_filename, SOURCE_ARCHIVE_EXTENSION};
pub use version::{PackageVersion, VersionParseError};
