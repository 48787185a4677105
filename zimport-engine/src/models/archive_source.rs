//! The spreadsheet discovered inside an extracted archive

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Kind of spreadsheet source recognized by a source probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
    /// Any other spreadsheet format, identified by media type
    Other(String),
}

impl SourceKind {
    /// Media type reported for this source
    pub fn media_type(&self) -> &str {
        match self {
            SourceKind::Csv => "text/csv",
            SourceKind::Tsv => "text/tab-separated-values",
            SourceKind::Other(media_type) => media_type,
        }
    }

    /// Only delimited-text sources can be re-read and rewritten
    pub fn is_delimited(&self) -> bool {
        matches!(self, SourceKind::Csv | SourceKind::Tsv)
    }
}

/// Delimited-text dialect
///
/// Must match what the row pipeline used to parse the file, otherwise
/// row/column alignment breaks when the file is rewritten. An enclosure of
/// NUL disables quoting entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialect {
    pub delimiter: u8,
    pub enclosure: u8,
    pub escape: Option<u8>,
}

impl Dialect {
    /// Comma-delimited, double-quote enclosed, quotes doubled
    ///
    /// Backslashes are ordinary data, so Windows paths survive a rewrite.
    pub const fn csv() -> Self {
        Self {
            delimiter: b',',
            enclosure: b'"',
            escape: None,
        }
    }

    /// Tab-delimited with no enclosure and no escape
    pub const fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            enclosure: 0,
            escape: None,
        }
    }

    fn quoting(&self) -> bool {
        self.enclosure != 0
    }

    /// Reader configured for this dialect
    ///
    /// Headers are not treated specially and rows may vary in length.
    pub fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .escape(self.escape)
            .double_quote(self.escape.is_none());
        if self.quoting() {
            builder.quote(self.enclosure);
        } else {
            builder.quoting(false);
        }
        builder
    }

    /// Writer configured for this dialect
    ///
    /// An escaping dialect writes embedded quotes escaped instead of doubled.
    pub fn writer_builder(&self) -> csv::WriterBuilder {
        let mut builder = csv::WriterBuilder::new();
        builder.has_headers(false).flexible(true).delimiter(self.delimiter);
        if let Some(escape) = self.escape {
            builder.double_quote(false).escape(escape);
        }
        if self.quoting() {
            builder.quote(self.enclosure);
        } else {
            builder.quote_style(csv::QuoteStyle::Never);
        }
        builder
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::csv()
    }
}

/// A spreadsheet-like source found in an archive
///
/// Immutable for the duration of a job; passed by value in the job arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveSource {
    /// Path of the spreadsheet inside the extracted archive
    pub path: PathBuf,

    /// Recognized source kind
    pub kind: SourceKind,

    /// Dialect the spreadsheet is parsed with
    pub dialect: Dialect,

    /// Header of the column holding row identifiers (empty until mapped)
    #[serde(default)]
    pub row_identifier_column: String,

    /// Header row read at upload time
    #[serde(default)]
    pub headers: Vec<String>,
}

impl ArchiveSource {
    pub fn new(path: PathBuf, kind: SourceKind, dialect: Dialect) -> Self {
        Self {
            path,
            kind,
            dialect,
            row_identifier_column: String::new(),
            headers: Vec::new(),
        }
    }

    /// Read the first row of a delimited source
    ///
    /// Returns an empty list for non-delimited sources and empty files.
    pub fn read_headers(&self) -> Result<Vec<String>, csv::Error> {
        if !self.kind.is_delimited() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let mut reader = self.dialect.reader_builder().from_reader(file);
        let mut record = csv::StringRecord::new();
        if !reader.read_record(&mut record)? {
            return Ok(Vec::new());
        }

        let headers: Vec<String> = record.iter().map(|h| h.trim().to_string()).collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Ok(Vec::new());
        }
        Ok(headers)
    }

    /// Position of `column` within the header row
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// File name of the spreadsheet
    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
