//! File Map builder
//!
//! Assigns every sibling of the spreadsheet to a row identifier:
//! - a sibling file `r1.jpg` belongs to row `r1` (last extension stripped)
//! - every file directly inside a sibling directory `r2/` belongs to row `r2`
//!
//! Files are filtered through the [`MediaValidator`]. Nested directories
//! inside a sibling directory are ignored. Entries are visited in name order,
//! so the result is deterministic and rebuilding yields an identical map.

use crate::models::FileMap;
use crate::services::media_validator::{split_file_name, MediaValidator};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File map plus the files that were left out
#[derive(Debug, Clone, Default)]
pub struct FileMapScan {
    pub file_map: FileMap,
    /// Files rejected by the media validator
    pub skipped: Vec<PathBuf>,
}

pub struct FileMapBuilder<'a> {
    validator: &'a MediaValidator,
}

impl<'a> FileMapBuilder<'a> {
    pub fn new(validator: &'a MediaValidator) -> Self {
        Self { validator }
    }

    /// Build the File Map for the spreadsheet at `spreadsheet_path`
    pub fn build_file_map(&self, spreadsheet_path: &Path) -> FileMap {
        self.scan(spreadsheet_path).file_map
    }

    /// Build the File Map and report skipped files
    pub fn scan(&self, spreadsheet_path: &Path) -> FileMapScan {
        let mut scan = FileMapScan::default();

        let Some(directory) = spreadsheet_path.parent() else {
            tracing::warn!(
                path = %spreadsheet_path.display(),
                "Spreadsheet has no parent directory"
            );
            return scan;
        };

        for entry in list_directory(directory) {
            let path = entry.path();
            if path == spreadsheet_path {
                continue;
            }

            let file_type = entry.file_type();
            if file_type.is_file() {
                let identifier = split_file_name(path).0.to_string();
                self.add_if_valid(&mut scan, &identifier, path);
            } else if file_type.is_dir() {
                let identifier = entry.file_name().to_string_lossy().to_string();
                for child in list_directory(path) {
                    if child.file_type().is_file() {
                        self.add_if_valid(&mut scan, &identifier, child.path());
                    }
                }
            }
        }

        tracing::debug!(
            spreadsheet = %spreadsheet_path.display(),
            identifiers = scan.file_map.len(),
            files = scan.file_map.file_count(),
            skipped = scan.skipped.len(),
            "File map built"
        );

        scan
    }

    fn add_if_valid(&self, scan: &mut FileMapScan, identifier: &str, path: &Path) {
        if self.validator.is_valid_media(path) {
            scan.file_map.insert(identifier, path.to_path_buf());
        } else {
            tracing::debug!(path = %path.display(), "Not valid media");
            scan.skipped.push(path.to_path_buf());
        }
    }
}

/// Immediate children of `directory` in name order
fn list_directory(directory: &Path) -> Vec<walkdir::DirEntry> {
    WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Error accessing entry: {}", e);
                None
            }
        })
        .collect()
}
