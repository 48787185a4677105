//! Arguments an import job is dispatched with

use crate::models::ArchiveSource;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Import job arguments
///
/// Built once at upload time and handed to the job by value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobArgs {
    /// Spreadsheet discovered in the archive
    pub source: ArchiveSource,

    /// Per-job temp directory holding the extracted archive
    pub temppath: PathBuf,

    /// Index of the row identifier column
    pub identifier_column: usize,

    /// Separator used when joining several media URLs into one cell
    #[serde(default = "default_multivalue_separator")]
    pub multivalue_separator: String,

    /// Free-form job comment; the download link is appended to it
    #[serde(default)]
    pub comment: Option<String>,

    /// Rows handed to the row pipeline per batch
    #[serde(default = "default_rows_per_batch")]
    pub rows_per_batch: usize,
}

fn default_multivalue_separator() -> String {
    ",".to_string()
}

fn default_rows_per_batch() -> usize {
    20
}

impl JobArgs {
    pub fn new(source: ArchiveSource, temppath: PathBuf, identifier_column: usize) -> Self {
        Self {
            source,
            temppath,
            identifier_column,
            multivalue_separator: default_multivalue_separator(),
            comment: None,
            rows_per_batch: default_rows_per_batch(),
        }
    }

    /// Path of the spreadsheet the job imports
    pub fn filepath(&self) -> &Path {
        &self.source.path
    }
}
