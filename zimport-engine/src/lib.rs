//! zimport-engine library interface
//!
//! Archive-to-spreadsheet media linking: an uploaded ZIP holding one
//! spreadsheet plus media is extracted, media files are matched to rows by
//! identifier, rows are imported through a [`types::RowPipeline`], and the
//! spreadsheet is handed back with `Media` and `Internal ID` columns.

pub mod error;
pub mod models;
pub mod services;
pub mod types;

pub use crate::error::{PipelineError, UploadError};
