//! File Map: row identifier → candidate media files
//!
//! Filled by the file map builder, drained by the orchestrator as rows
//! consume their entries. Whatever is left after the row pipeline finishes
//! is orphaned media.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Name of the ingester every file map entry is routed through
pub const TEMPFILE_INGESTER: &str = "tempfile";

/// One media file assumed to belong to a spreadsheet row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMapEntry {
    pub identifier: String,
    pub ingester: String,
    pub file_path: PathBuf,
}

impl FileMapEntry {
    pub fn new(identifier: impl Into<String>, file_path: PathBuf) -> Self {
        Self {
            identifier: identifier.into(),
            ingester: TEMPFILE_INGESTER.to_string(),
            file_path,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMap {
    entries: BTreeMap<String, Vec<FileMapEntry>>,
}

impl FileMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `file_path` to the list for `identifier`
    pub fn insert(&mut self, identifier: &str, file_path: PathBuf) {
        self.entries
            .entry(identifier.to_string())
            .or_default()
            .push(FileMapEntry::new(identifier, file_path));
    }

    /// Remove and return every entry for `identifier`
    ///
    /// An unknown identifier yields an empty list.
    pub fn take(&mut self, identifier: &str) -> Vec<FileMapEntry> {
        self.entries.remove(identifier).unwrap_or_default()
    }

    pub fn get(&self, identifier: &str) -> Option<&[FileMapEntry]> {
        self.entries.get(identifier).map(Vec::as_slice)
    }

    /// Number of distinct identifiers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of files across all identifiers
    pub fn file_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FileMapEntry])> {
        self.entries
            .iter()
            .map(|(id, entries)| (id.as_str(), entries.as_slice()))
    }
}
