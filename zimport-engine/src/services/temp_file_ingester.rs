//! Temp-file media ingester
//!
//! Ingests media from a local path that must lie inside the managed
//! directory (the temp root). The file is copied into a holding area and
//! validated there, so later changes to the source cannot alter what was
//! checked. Every failure is recorded as a field-level error in an
//! [`ErrorStore`] under [`FILEPATH_FIELD`]; ingesting never fails hard.

use crate::models::archive_source::file_name_of;
use crate::services::media_validator::{
    sniff_media_type, split_file_name, MediaValidator, UNKNOWN_MEDIA_TYPE,
};
use crate::types::IngestInstruction;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Instruction field that file path errors are keyed under
pub const FILEPATH_FIELD: &str = "filepath";

/// Field-level validation errors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorStore {
    errors: BTreeMap<String, Vec<String>>,
}

impl ErrorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors_for(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All messages, field by field
    pub fn messages(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors
            .iter()
            .flat_map(|(field, messages)| {
                messages.iter().map(move |m| (field.as_str(), m.as_str()))
            })
    }
}

/// A validated copy of an ingested file, waiting to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedMedia {
    /// Path the instruction named
    pub source: PathBuf,
    /// Copy in the holding area
    pub staged_path: PathBuf,
    /// File name of the source
    pub original_name: String,
    pub media_type: String,
    pub extension: Option<String>,
    pub store_original: bool,
}

impl StagedMedia {
    /// Remove the holding-area copy
    pub fn discard(&self) {
        if let Err(e) = fs::remove_file(&self.staged_path) {
            tracing::warn!(
                path = %self.staged_path.display(),
                error = %e,
                "Failed to remove staged media"
            );
        }
    }
}

pub struct TempFileIngester {
    managed_directory: PathBuf,
    holding_directory: PathBuf,
    validator: MediaValidator,
    delete_when_done: bool,
}

impl TempFileIngester {
    pub fn new(
        managed_directory: impl Into<PathBuf>,
        holding_directory: impl Into<PathBuf>,
        validator: MediaValidator,
    ) -> Self {
        Self {
            managed_directory: managed_directory.into(),
            holding_directory: holding_directory.into(),
            validator,
            delete_when_done: false,
        }
    }

    /// Remove the source file after a successful ingest
    pub fn with_delete_when_done(mut self, delete_when_done: bool) -> Self {
        self.delete_when_done = delete_when_done;
        self
    }

    pub fn managed_directory(&self) -> &Path {
        &self.managed_directory
    }

    /// Ingest the file named by `instruction`
    ///
    /// Returns `None` with at least one error recorded in `errors` when the
    /// file cannot be ingested.
    pub fn ingest(
        &self,
        instruction: &IngestInstruction,
        errors: &mut ErrorStore,
    ) -> Option<StagedMedia> {
        let Some(filepath) = instruction.filepath.as_deref() else {
            errors.add_error(FILEPATH_FIELD, "No ingest filename specified");
            return None;
        };

        let source = self.check_source(filepath, errors)?;

        if let Err(e) = fs::create_dir_all(&self.holding_directory) {
            tracing::error!(
                path = %self.holding_directory.display(),
                error = %e,
                "Cannot create holding directory"
            );
            errors.add_error(
                FILEPATH_FIELD,
                format!("Cannot stage ingest file: {}", file_name_of(filepath)),
            );
            return None;
        }

        let extension = split_file_name(&source).1.map(str::to_string);
        let staged_name = match &extension {
            Some(ext) => format!("{}.{}", Uuid::new_v4().simple(), ext),
            None => Uuid::new_v4().simple().to_string(),
        };
        let staged_path = self.holding_directory.join(staged_name);

        if let Err(e) = fs::copy(&source, &staged_path) {
            tracing::error!(source = %source.display(), error = %e, "Failed to copy ingest file");
            errors.add_error(
                FILEPATH_FIELD,
                format!("Cannot stage ingest file: {}", file_name_of(filepath)),
            );
            return None;
        }

        if !self.validator.is_valid_media(&staged_path) {
            let _ = fs::remove_file(&staged_path);
            errors.add_error(
                FILEPATH_FIELD,
                format!("Ingest file is not valid media: {}", file_name_of(filepath)),
            );
            return None;
        }

        let media_type = sniff_media_type(&staged_path)
            .map(str::to_string)
            .unwrap_or_else(|_| UNKNOWN_MEDIA_TYPE.to_string());

        if self.delete_when_done {
            if let Err(e) = fs::remove_file(&source) {
                tracing::warn!(
                    path = %source.display(),
                    error = %e,
                    "Failed to remove ingested file"
                );
            }
        }

        Some(StagedMedia {
            original_name: file_name_of(&source),
            source,
            staged_path,
            media_type,
            extension,
            store_original: instruction.store_original.unwrap_or(true),
        })
    }

    /// Resolve `filepath` and check it may be ingested
    fn check_source(&self, filepath: &Path, errors: &mut ErrorStore) -> Option<PathBuf> {
        let managed = match fs::canonicalize(&self.managed_directory) {
            Ok(managed) => managed,
            Err(e) => {
                tracing::error!(
                    path = %self.managed_directory.display(),
                    error = %e,
                    "Managed directory is not accessible"
                );
                errors.add_error(FILEPATH_FIELD, "Ingest directory is not accessible");
                return None;
            }
        };

        let source = match fs::canonicalize(filepath) {
            Ok(source) => source,
            Err(_) => {
                errors.add_error(
                    FILEPATH_FIELD,
                    format!("Ingest file not found: {}", file_name_of(filepath)),
                );
                return None;
            }
        };

        if !source.starts_with(&managed) {
            tracing::error!(
                path = %source.display(),
                managed = %managed.display(),
                "Ingest file outside managed directory"
            );
            errors.add_error(
                FILEPATH_FIELD,
                format!(
                    "Ingest file is not inside the managed directory: {}",
                    file_name_of(filepath)
                ),
            );
            return None;
        }

        let readable = source.is_file() && File::open(&source).is_ok();
        if !readable {
            errors.add_error(
                FILEPATH_FIELD,
                format!("Ingest file is not a readable regular file: {}", file_name_of(filepath)),
            );
            return None;
        }

        if self.delete_when_done {
            let writable = source
                .parent()
                .and_then(|parent| fs::metadata(parent).ok())
                .map(|m| !m.permissions().readonly())
                .unwrap_or(false);
            if !writable {
                errors.add_error(
                    FILEPATH_FIELD,
                    format!("Ingest directory is not writable: {}", file_name_of(filepath)),
                );
                return None;
            }
        }

        Some(source)
    }
}
