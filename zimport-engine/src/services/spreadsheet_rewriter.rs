//! Spreadsheet rewriter
//!
//! Re-reads the imported spreadsheet with its original dialect and writes a
//! copy beside it with two appended columns: the row's media URLs and the id
//! of the resource created for it. The original file is left untouched.

use crate::error::RewriteError;
use crate::models::{Dialect, MediaMap, SourceKind};
use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Header of the appended media URL column
pub const MEDIA_COLUMN: &str = "Media";
/// Header of the appended resource id column
pub const INTERNAL_ID_COLUMN: &str = "Internal ID";
/// Appended to the original path to name the rewritten file
pub const REWRITE_SUFFIX: &str = "-mod";

/// Path the rewritten copy of `original` is written to
pub fn rewritten_path(original: &Path) -> PathBuf {
    let mut path = OsString::from(original.as_os_str());
    path.push(REWRITE_SUFFIX);
    PathBuf::from(path)
}

/// Rewrite `original` with `Media` and `Internal ID` columns appended
///
/// Rows whose identifier (trimmed value at `identifier_column`) is not in the
/// Media Map get two empty fields. Returns `None` without touching anything
/// for non-delimited sources.
pub fn rewrite(
    original: &Path,
    kind: &SourceKind,
    dialect: &Dialect,
    identifier_column: usize,
    media_map: &MediaMap,
    multivalue_separator: &str,
) -> Result<Option<PathBuf>, RewriteError> {
    if !kind.is_delimited() {
        tracing::warn!(
            path = %original.display(),
            media_type = kind.media_type(),
            "Spreadsheet left unchanged: only delimited sources can be rewritten"
        );
        return Ok(None);
    }

    let output = rewritten_path(original);
    let mut reader = dialect.reader_builder().from_reader(File::open(original)?);
    let mut writer = dialect.writer_builder().from_writer(File::create(&output)?);

    let mut record = csv::ByteRecord::new();
    let mut is_header = true;
    let mut rows_linked = 0usize;

    while reader.read_byte_record(&mut record)? {
        if is_header {
            record.push_field(MEDIA_COLUMN.as_bytes());
            record.push_field(INTERNAL_ID_COLUMN.as_bytes());
            is_header = false;
        } else {
            let identifier = record
                .get(identifier_column)
                .map(|value| String::from_utf8_lossy(value).trim().to_string())
                .unwrap_or_default();

            match media_map.get(&identifier).filter(|_| !identifier.is_empty()) {
                Some(entry) => {
                    record.push_field(entry.media_urls.join(multivalue_separator).as_bytes());
                    record.push_field(entry.resource_id.to_string().as_bytes());
                    rows_linked += 1;
                }
                None => {
                    record.push_field(b"");
                    record.push_field(b"");
                }
            }
        }

        writer.write_byte_record(&record)?;
    }

    writer.flush()?;

    tracing::debug!(
        original = %original.display(),
        output = %output.display(),
        rows_linked,
        "Spreadsheet rewritten"
    );

    Ok(Some(output))
}
