//! Error types for zimport-engine
//!
//! - `UploadError`: user input errors, reported before any job starts
//! - `SandboxError`, `RewriteError`, `StoreError`: failures the orchestrator
//!   catches and turns into soft job errors
//! - `PipelineError`: fatal row pipeline failures, propagated to the caller

use std::path::PathBuf;
use thiserror::Error;

/// User input errors at the upload boundary
///
/// The display text is meant to be shown to the user as-is.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The upload could not be opened as a ZIP archive
    #[error("Must upload a zipfile.")]
    NotAnArchive { reason: String },

    /// The archive opened but could not be extracted
    #[error("Zipfile is invalid. It may be corrupted.")]
    CorruptArchive { reason: String },

    /// No file in the archive was recognized as a spreadsheet
    #[error("No spreadsheet found in archive")]
    NoSpreadsheet,

    /// The spreadsheet was found but cannot be imported
    #[error("{0}")]
    InvalidSpreadsheet(String),

    /// The selected identifier column is not a spreadsheet header
    #[error("Identifier column '{0}' is not a spreadsheet header")]
    UnknownColumn(String),

    /// Temp directory could not be prepared
    #[error("Could not prepare temp directory: {0}")]
    TempDirectory(#[from] SandboxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Sandbox errors
///
/// A rejected containment check is not an error; see `SandboxOutcome`.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// The fresh temp path is not a directory after creation
    #[error("Unable to create temporary directory: {0}")]
    TempDirectoryCreation(PathBuf),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory traversal failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// File store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Relative storage path escapes the store or is empty
    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Spreadsheet rewrite errors
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Row pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The spreadsheet cannot be processed by this pipeline
    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),

    /// A resource could not be read back
    #[error("Resource {0} not found")]
    ResourceNotFound(i64),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pipeline error: {0}")]
    Other(String),
}
