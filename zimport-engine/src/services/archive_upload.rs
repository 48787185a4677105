//! Upload boundary: ZIP archive → prepared import job
//!
//! Opens the uploaded archive, extracts it into a fresh sandboxed temp
//! directory, locates the spreadsheet and reads its headers. Every failure is
//! an [`UploadError`] whose message can be shown to the user; no job is
//! created and no temp directory is left behind.

use crate::error::UploadError;
use crate::models::{ArchiveSource, JobArgs};
use crate::services::archive_discovery::{ArchiveDiscovery, DEFAULT_MAX_DEPTH};
use crate::services::path_sandbox::PathSandbox;
use crate::types::SourceProbe;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Component, Path, PathBuf};
use zip::result::ZipError;
use zip::ZipArchive;

/// Keep only normal components of an archive entry name
///
/// Returns `None` when nothing is left (e.g. `..` or `/`).
fn sanitize_path(path: &str) -> Option<PathBuf> {
    let mut sanitized = PathBuf::new();
    for component in Path::new(path).components() {
        if let Component::Normal(part) = component {
            sanitized.push(part);
        }
    }

    if sanitized.as_os_str().is_empty() {
        None
    } else {
        Some(sanitized)
    }
}

/// Extract every entry of `archive` below `destination`
///
/// Returns the number of files written.
fn extract_into<R: io::Read + io::Seek>(
    archive: &mut ZipArchive<R>,
    destination: &Path,
) -> Result<usize, ZipError> {
    let mut written = 0;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;

        let Some(relative) = sanitize_path(entry.name()) else {
            tracing::warn!(entry = entry.name(), "Skipping archive entry with unusable path");
            continue;
        };
        let target = destination.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut output = File::create(&target)?;
        io::copy(&mut entry, &mut output)?;
        written += 1;
    }

    Ok(written)
}

/// An extracted archive with its spreadsheet located
#[derive(Debug, Clone)]
pub struct PreparedUpload {
    /// Per-job temp directory holding the extracted archive
    pub temp_path: PathBuf,
    pub source: ArchiveSource,
}

impl PreparedUpload {
    pub fn headers(&self) -> &[String] {
        &self.source.headers
    }

    /// Build job arguments, resolving the identifier column by header name
    pub fn job_args(
        &self,
        identifier_column: &str,
        multivalue_separator: &str,
        comment: Option<String>,
        rows_per_batch: usize,
    ) -> Result<JobArgs, UploadError> {
        let index = self
            .source
            .column_index(identifier_column)
            .ok_or_else(|| UploadError::UnknownColumn(identifier_column.to_string()))?;

        let mut source = self.source.clone();
        source.row_identifier_column = identifier_column.to_string();

        let mut args = JobArgs::new(source, self.temp_path.clone(), index);
        args.multivalue_separator = multivalue_separator.to_string();
        args.comment = comment;
        args.rows_per_batch = rows_per_batch;
        Ok(args)
    }
}

pub struct ArchiveUpload<'a> {
    sandbox: &'a PathSandbox,
    probe: &'a dyn SourceProbe,
    remove_archive: bool,
}

impl<'a> ArchiveUpload<'a> {
    pub fn new(sandbox: &'a PathSandbox, probe: &'a dyn SourceProbe) -> Self {
        Self {
            sandbox,
            probe,
            remove_archive: true,
        }
    }

    /// Keep the uploaded archive instead of deleting it once extracted
    pub fn keep_archive(mut self, keep: bool) -> Self {
        self.remove_archive = !keep;
        self
    }

    /// Extract `archive` and prepare it for import
    pub fn receive(&self, archive: &Path) -> Result<PreparedUpload, UploadError> {
        let file = File::open(archive).map_err(|e| UploadError::NotAnArchive {
            reason: e.to_string(),
        })?;
        let mut zip = ZipArchive::new(BufReader::new(file)).map_err(|e| UploadError::NotAnArchive {
            reason: e.to_string(),
        })?;

        let temp_path = self.sandbox.create_fresh_directory()?;

        match extract_into(&mut zip, &temp_path) {
            Ok(count) => {
                tracing::info!(
                    archive = %archive.display(),
                    temp = %temp_path.display(),
                    files = count,
                    "Archive extracted"
                );
            }
            Err(e) => {
                tracing::error!(
                    archive = %archive.display(),
                    error = %e,
                    "Archive extraction failed"
                );
                self.discard(&temp_path);
                self.remove_uploaded(archive);
                return Err(UploadError::CorruptArchive {
                    reason: e.to_string(),
                });
            }
        }

        if let Err(e) = self.sandbox.set_permissions_recursive(&temp_path) {
            tracing::warn!(
                temp = %temp_path.display(),
                error = %e,
                "Failed to set temp permissions"
            );
        }
        self.remove_uploaded(archive);

        let discovery = ArchiveDiscovery::new(self.probe);
        let Some(mut source) = discovery.discover_spreadsheet(&temp_path, DEFAULT_MAX_DEPTH) else {
            self.discard(&temp_path);
            return Err(UploadError::NoSpreadsheet);
        };

        source.headers = match source.read_headers() {
            Ok(headers) if !headers.is_empty() => headers,
            Ok(_) => {
                self.discard(&temp_path);
                return Err(UploadError::InvalidSpreadsheet("The file has no headers.".to_string()));
            }
            Err(e) => {
                tracing::warn!(
                    path = %source.path.display(),
                    error = %e,
                    "Spreadsheet header read failed"
                );
                self.discard(&temp_path);
                return Err(UploadError::InvalidSpreadsheet("The file is not valid.".to_string()));
            }
        };

        Ok(PreparedUpload { temp_path, source })
    }

    fn discard(&self, temp_path: &Path) {
        if let Err(e) = self.sandbox.delete_recursive(temp_path) {
            tracing::error!(
                temp = %temp_path.display(),
                error = %e,
                "Failed to remove temp directory"
            );
        }
    }

    fn remove_uploaded(&self, archive: &Path) {
        if !self.remove_archive {
            return;
        }
        if let Err(e) = fs::remove_file(archive) {
            tracing::warn!(
                archive = %archive.display(),
                error = %e,
                "Failed to remove uploaded archive"
            );
        }
    }
}
