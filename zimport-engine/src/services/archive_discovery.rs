//! Spreadsheet discovery inside an extracted archive
//!
//! First match wins: files of a directory are probed in name order before
//! any subdirectory is entered, and subdirectories are only searched down to
//! `max_depth` levels (one by default). A spreadsheet two levels below the
//! archive root is not found.

use crate::models::ArchiveSource;
use crate::types::SourceProbe;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Levels below the archive root searched by default
pub const DEFAULT_MAX_DEPTH: usize = 1;

pub struct ArchiveDiscovery<'a> {
    probe: &'a dyn SourceProbe,
}

impl<'a> ArchiveDiscovery<'a> {
    pub fn new(probe: &'a dyn SourceProbe) -> Self {
        Self { probe }
    }

    /// Find the spreadsheet in `directory`, searching `max_depth` levels down
    pub fn discover_spreadsheet(
        &self,
        directory: &Path,
        max_depth: usize,
    ) -> Option<ArchiveSource> {
        let (files, dirs) = list_children(directory);

        for file in &files {
            if let Some(source) = self.probe.build_source(file) {
                tracing::info!(
                    path = %file.display(),
                    kind = ?source.kind,
                    "Spreadsheet found in archive"
                );
                return Some(source);
            }
        }

        if max_depth == 0 {
            return None;
        }

        dirs.iter()
            .find_map(|dir| self.discover_spreadsheet(dir, max_depth - 1))
    }
}

/// Immediate children of `directory`, as (files, directories), name-ordered
///
/// Symlinks are neither probed nor entered.
fn list_children(directory: &Path) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut files = Vec::new();
    let mut dirs = Vec::new();

    let walker = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        match entry {
            Ok(entry) => {
                let file_type = entry.file_type();
                if file_type.is_dir() {
                    dirs.push(entry.into_path());
                } else if file_type.is_file() {
                    files.push(entry.into_path());
                }
            }
            Err(e) => {
                tracing::warn!("Error accessing entry: {}", e);
            }
        }
    }

    (files, dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::DelimitedSourceProbe;
    use std::fs;
    use tempfile::TempDir;

    fn discover(dir: &Path) -> Option<ArchiveSource> {
        let probe = DelimitedSourceProbe;
        ArchiveDiscovery::new(&probe).discover_spreadsheet(dir, DEFAULT_MAX_DEPTH)
    }

    #[test]
    fn test_top_level_spreadsheet() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("sheet.csv"), "id\n").unwrap();
        fs::write(temp.path().join("r1.jpg"), b"x").unwrap();

        let source = discover(temp.path()).unwrap();
        assert_eq!(source.path, temp.path().join("sheet.csv"));
    }

    #[test]
    fn test_one_level_deep_spreadsheet() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("export")).unwrap();
        fs::write(temp.path().join("export").join("sheet.tsv"), "id\n").unwrap();

        let source = discover(temp.path()).unwrap();
        assert_eq!(source.path, temp.path().join("export").join("sheet.tsv"));
    }

    #[test]
    fn test_two_levels_deep_is_not_found() {
        let temp = TempDir::new().unwrap();
        let deep = temp.path().join("a").join("b");
        fs::create_dir_all(&deep).unwrap();
        fs::write(deep.join("sheet.csv"), "id\n").unwrap();

        assert!(discover(temp.path()).is_none());
    }

    #[test]
    fn test_files_win_over_subdirectories() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a")).unwrap();
        fs::write(temp.path().join("a").join("first.csv"), "id\n").unwrap();
        fs::write(temp.path().join("z.csv"), "id\n").unwrap();

        let source = discover(temp.path()).unwrap();
        assert_eq!(source.path, temp.path().join("z.csv"));
    }

    #[test]
    fn test_first_match_in_name_order() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.csv"), "id\n").unwrap();
        fs::write(temp.path().join("a.csv"), "id\n").unwrap();

        let source = discover(temp.path()).unwrap();
        assert_eq!(source.path, temp.path().join("a.csv"));
    }

    #[test]
    fn test_zero_depth_skips_subdirectories() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("export")).unwrap();
        fs::write(temp.path().join("export").join("sheet.csv"), "id\n").unwrap();

        let probe = DelimitedSourceProbe;
        assert!(ArchiveDiscovery::new(&probe)
            .discover_spreadsheet(temp.path(), 0)
            .is_none());
    }
}
