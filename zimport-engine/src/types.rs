//! Core Types and Trait Definitions for zimport-engine
//!
//! The engine composes with collaborators it does not own:
//! - **RowPipeline**: the tabular import engine that creates one resource
//!   per spreadsheet row, calling back into [`BatchHooks`]
//! - **ResourceReader**: read API used to look up created resources
//! - **SourceProbe**: recognizes spreadsheet-like files
//! - **FileStore**: persistent storage for media and result files
//!
//! Reference implementations live in `services` (`LocalCatalog`,
//! `DelimitedSourceProbe`, `LocalFileStore`).

use crate::error::{PipelineError, StoreError};
use crate::models::{ArchiveSource, FileMapEntry, JobArgs, TEMPFILE_INGESTER};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Instruction to ingest one media file from a local path
///
/// `filepath` is optional on the wire; a missing path is reported by the
/// ingester as a field-level error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestInstruction {
    pub ingester: String,
    #[serde(default)]
    pub filepath: Option<PathBuf>,
    /// Store the original file (default true)
    #[serde(default)]
    pub store_original: Option<bool>,
}

impl From<FileMapEntry> for IngestInstruction {
    fn from(entry: FileMapEntry) -> Self {
        Self {
            ingester: entry.ingester,
            filepath: Some(entry.file_path),
            store_original: None,
        }
    }
}

impl IngestInstruction {
    pub fn tempfile(filepath: PathBuf) -> Self {
        Self {
            ingester: TEMPFILE_INGESTER.to_string(),
            filepath: Some(filepath),
            store_original: None,
        }
    }
}

/// One spreadsheet row about to be created
#[derive(Debug, Clone)]
pub struct RowData {
    /// 1-based position among data rows
    pub row_number: usize,
    /// Declared row identifier
    pub identifier: String,
    /// Raw cell values
    pub values: Vec<String>,
    /// Media to ingest together with the resource
    pub media: Vec<IngestInstruction>,
}

/// Reference to a resource the pipeline created or updated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReference {
    pub id: i64,
    pub resource_name: String,
}

/// Read API over created resources
pub trait ResourceReader {
    /// Value of the resource's declared unique identifier field
    fn identifier_value(&self, resource: &ResourceReference)
        -> Result<Option<String>, PipelineError>;

    /// Public URLs of the resource's media, in order of attachment
    fn media_urls(&self, resource: &ResourceReference) -> Result<Vec<String>, PipelineError>;
}

/// Callbacks a row pipeline invokes while importing
pub trait BatchHooks {
    /// Called with each batch before its resources are created
    fn before_batch(&mut self, rows: &mut [RowData]);

    /// Called after each resource is created or updated
    fn after_resource(&mut self, resource: &ResourceReference, reader: &dyn ResourceReader);
}

/// Summary returned by a row pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub rows_processed: usize,
    /// Rows the pipeline itself flagged (e.g. rejected media)
    pub row_errors: usize,
}

/// External tabular import engine
pub trait RowPipeline {
    /// Import every row of `args.source`, invoking `hooks` along the way
    ///
    /// Rows are delivered in batches of `args.rows_per_batch`, in file order.
    fn run(
        &mut self,
        args: &JobArgs,
        hooks: &mut dyn BatchHooks,
    ) -> Result<PipelineOutcome, PipelineError>;
}

/// Recognizes spreadsheet-like files
pub trait SourceProbe {
    /// Build a source for `path` if this probe recognizes it
    fn build_source(&self, path: &Path) -> Option<ArchiveSource>;
}

/// Persistent file storage
pub trait FileStore: Send + Sync {
    /// Copy `source` into the store at `relative_path`
    fn put(&self, source: &Path, relative_path: &str) -> Result<(), StoreError>;

    /// Public URI of a stored file
    fn uri(&self, relative_path: &str) -> String;
}
