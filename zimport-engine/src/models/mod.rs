//! Data models for zimport-engine
//!
//! - Discovered spreadsheet source and its dialect
//! - File Map (pending media per row identifier)
//! - Media Map (created resource and media URLs per row identifier)
//! - Job state machine, arguments and report

pub mod archive_source;
pub mod file_map;
pub mod job_args;
pub mod job_result;
pub mod job_state;
pub mod media_map;

pub use archive_source::{ArchiveSource, Dialect, SourceKind};
pub use file_map::{FileMap, FileMapEntry, TEMPFILE_INGESTER};
pub use job_args::JobArgs;
pub use job_result::{JobMessage, JobReport, Severity};
pub use job_state::{JobState, JobStatus, StateTransition};
pub use media_map::{MediaMap, MediaMapEntry};
