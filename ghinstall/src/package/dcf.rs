//! Reader and writer for the Debian Control File format.
//!
//! Both the package manifest (`DESCRIPTION`) and the repository index
//! (`PACKAGES`) use DCF: `Field: value` lines, continuation lines starting
//! with whitespace, and blank lines separating records.

use std::fmt::Write as _;

use thiserror::Error;

/// Errors raised while reading DCF content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DcfError {
    /// A continuation line appeared before any field.
    #[error("line {line}: continuation line without a preceding field")]
    OrphanContinuation { line: usize },

    /// A line had no `:` separator.
    #[error("line {line}: expected 'Field: value', got '{content}'")]
    MissingSeparator { line: usize, content: String },

    /// A field name was empty.
    #[error("line {line}: empty field name")]
    EmptyField { line: usize },
}

/// One DCF record: fields in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DcfRecord {
    fields: Vec<(String, String)>,
}

impl DcfRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a field by name (case-sensitive, as the host does).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set a field, replacing an existing value in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Iterate over `(field, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// Parse DCF content into records.
///
/// Continuation lines are joined to the previous value with a newline and
/// their leading whitespace is stripped. Records with no fields (runs of
/// blank lines) are skipped.
pub fn parse_dcf(content: &str) -> Result<Vec<DcfRecord>, DcfError> {
    let mut records = Vec::new();
    let mut current = DcfRecord::new();

    for (index, raw_line) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim_end_matches('\r');

        if line.trim().is_empty() {
            if !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
            continue;
        }

        if line.starts_with(' ') || line.starts_with('\t') {
            let last = current
                .fields
                .last_mut()
                .ok_or(DcfError::OrphanContinuation { line: line_no })?;
            let text = line.trim();
            // A lone "." marks a blank line inside a long value.
            let text = if text == "." { "" } else { text };
            last.1.push('\n');
            last.1.push_str(text);
            continue;
        }

        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| DcfError::MissingSeparator {
                line: line_no,
                content: line.to_string(),
            })?;

        let name = name.trim();
        if name.is_empty() {
            return Err(DcfError::EmptyField { line: line_no });
        }
        current.set(name, value.trim());
    }

    if !current.is_empty() {
        records.push(current);
    }

    Ok(records)
}

/// Serialize records back to DCF.
///
/// Values with embedded newlines are written as continuation lines.
pub fn serialize_dcf(records: &[DcfRecord]) -> String {
    let mut out = String::new();

    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for (name, value) in record.iter() {
            let mut lines = value.split('\n');
            let first = lines.next().unwrap_or_default();
            let _ = writeln!(out, "{}: {}", name, first);
            for line in lines {
                let line = if line.is_empty() { "." } else { line };
                let _ = writeln!(out, "    {}", line);
            }
        }
    }

    out
}
