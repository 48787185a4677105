//! Service modules for archive import
//!
//! Leaves first: media validation and the path sandbox, then discovery and
//! File Map building, the spreadsheet rewriter, and the orchestrator that
//! drives a job. `archive_upload`, `local_catalog`, `file_store` and
//! `source_probe` implement the collaborator seams for local use.

pub mod archive_discovery;
pub mod archive_upload;
pub mod file_map_builder;
pub mod file_store;
pub mod import_orchestrator;
pub mod local_catalog;
pub mod media_validator;
pub mod path_sandbox;
pub mod source_probe;
pub mod spreadsheet_rewriter;
pub mod temp_file_ingester;

pub use archive_discovery::{ArchiveDiscovery, DEFAULT_MAX_DEPTH};
pub use archive_upload::{ArchiveUpload, PreparedUpload};
pub use file_map_builder::{FileMapBuilder, FileMapScan};
pub use file_store::LocalFileStore;
pub use import_orchestrator::{ImportOrchestrator, MediaLinker};
pub use local_catalog::{CatalogMedia, CatalogResource, LocalCatalog};
pub use media_validator::MediaValidator;
pub use path_sandbox::{NoopVisitor, PathSandbox, SandboxOutcome, TreeVisitor};
pub use source_probe::DelimitedSourceProbe;
pub use temp_file_ingester::{ErrorStore, StagedMedia, TempFileIngester, FILEPATH_FIELD};
