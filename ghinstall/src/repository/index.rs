//! Repository index (`PACKAGES`) generation.
//!
//! The index lists every archive under `src/contrib` with the manifest
//! fields the installer needs for dependency resolution. It is written both
//! plain and gzip-compressed, as the host's installer asks for either.

use std::fs;
use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use super::{RepositoryError, RepositoryResult};
use crate::package::{parse_dcf, serialize_dcf, DcfRecord, PackageDescription, PackageVersion};

/// Plain index filename.
pub const INDEX_FILENAME: &str = "PACKAGES";

/// Compressed index filename.
pub const INDEX_GZ_FILENAME: &str = "PACKAGES.gz";

/// Manifest fields copied into the index, in output order.
const INDEX_FIELDS: &[&str] = &[
    "Depends",
    "Imports",
    "LinkingTo",
    "Suggests",
    "Enhances",
    "License",
    "License_is_FOSS",
    "License_restricts_use",
    "OS_type",
    "Archs",
    "MD5sum",
    "NeedsCompilation",
];

/// One package entry of the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Package name.
    pub name: String,

    /// Package version.
    pub version: PackageVersion,

    /// Archive filename under `src/contrib`.
    pub archive: String,

    /// Index record (`Package`, `Version`, then dependency and license fields).
    record: DcfRecord,
}

impl IndexEntry {
    /// Build an index entry from a package manifest.
    ///
    /// Multi-line field values are folded onto one line.
    pub fn from_description(description: &PackageDescription, archive: impl Into<String>) -> Self {
        let mut record = DcfRecord::new();
        record.set("Package", description.name());
        record.set("Version", description.version().as_str());

        for field in INDEX_FIELDS {
            if let Some(value) = description.field(field) {
                let folded = value.split_whitespace().collect::<Vec<_>>().join(" ");
                if !folded.is_empty() {
                    record.set(*field, folded);
                }
            }
        }

        Self {
            name: description.name().to_string(),
            version: description.version().clone(),
            archive: archive.into(),
            record,
        }
    }

    /// Look up a field of the index record.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.record.get(name)
    }
}

/// Serialize entries to index text.
pub fn serialize_index(entries: &[IndexEntry]) -> String {
    let records: Vec<DcfRecord> = entries.iter().map(|e| e.record.clone()).collect();
    serialize_dcf(&records)
}

/// Read the `(name, version)` pairs listed by index text.
///
/// Records lacking either field are skipped.
pub fn read_index(content: &str) -> Vec<(String, PackageVersion)> {
    parse_dcf(content)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|record| {
            let name = record.get("Package")?.to_string();
            let version = record.get("Version")?.parse().ok()?;
            Some((name, version))
        })
        .collect()
}

/// Write `PACKAGES` and `PACKAGES.gz` into `contrib_dir`.
pub fn write_index(contrib_dir: &Path, entries: &[IndexEntry]) -> RepositoryResult<()> {
    let content = serialize_index(entries);

    let plain_path = contrib_dir.join(INDEX_FILENAME);
    fs::write(&plain_path, &content).map_err(|e| RepositoryError::WriteFailed {
        path: plain_path.clone(),
        source: e,
    })?;

    let gz_path = contrib_dir.join(INDEX_GZ_FILENAME);
    let write_gz = || -> std::io::Result<()> {
        let file = fs::File::create(&gz_path)?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(content.as_bytes())?;
        encoder.finish()?.sync_all()
    };
    write_gz().map_err(|e| RepositoryError::WriteFailed {
        path: gz_path.clone(),
        source: e,
    })?;

    Ok(())
}
