//! Delimited-text spreadsheet probe

use crate::models::{ArchiveSource, Dialect, SourceKind};
use crate::types::SourceProbe;
use std::path::Path;

/// Recognizes `.csv` and `.tsv`/`.tab` files by extension
///
/// Extensions match case-insensitively. The dialect is the conventional one
/// for each format.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelimitedSourceProbe;

impl SourceProbe for DelimitedSourceProbe {
    fn build_source(&self, path: &Path) -> Option<ArchiveSource> {
        if !path.is_file() {
            return None;
        }

        let ext = path.extension()?.to_string_lossy().to_lowercase();
        let (kind, dialect) = match ext.as_str() {
            "csv" => (SourceKind::Csv, Dialect::csv()),
            "tsv" | "tab" => (SourceKind::Tsv, Dialect::tsv()),
            _ => return None,
        };

        Some(ArchiveSource::new(path.to_path_buf(), kind, dialect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_recognizes_delimited_extensions() {
        let temp = TempDir::new().unwrap();
        for name in ["a.csv", "b.TSV", "c.tab", "d.jpg"] {
            fs::write(temp.path().join(name), "id\n").unwrap();
        }

        let probe = DelimitedSourceProbe;
        assert_eq!(probe.build_source(&temp.path().join("a.csv")).unwrap().kind, SourceKind::Csv);
        assert_eq!(probe.build_source(&temp.path().join("b.TSV")).unwrap().dialect, Dialect::tsv());
        assert!(probe.build_source(&temp.path().join("c.tab")).is_some());
        assert!(probe.build_source(&temp.path().join("d.jpg")).is_none());
        assert!(probe.build_source(&temp.path().join("missing.csv")).is_none());
    }
}
