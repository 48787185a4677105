//! Filesystem fixtures: media bytes, archives, and a wired-up environment

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use zimport_common::config::{ImportSettings, LoggingConfig};
use zimport_engine::services::{
    ImportOrchestrator, LocalCatalog, LocalFileStore, MediaValidator, PathSandbox,
    TempFileIngester,
};
use zip::write::SimpleFileOptions;

/// Smallest byte sequence sniffed as `image/png`
pub const PNG: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, b'I', b'H', b'D', b'R',
];

/// Smallest byte sequence sniffed as `image/jpeg`
pub const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F', 0, 1];

/// Write a ZIP archive at `path`
///
/// Entry names ending in `/` become directories.
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, contents) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options).unwrap();
        } else {
            zip.start_file(*name, options).unwrap();
            zip.write_all(contents).unwrap();
        }
    }

    zip.finish().unwrap();
}

/// Temp root, storage directory and settings under one temp directory
pub struct TestEnv {
    pub base: TempDir,
    pub settings: ImportSettings,
}

impl TestEnv {
    pub fn new() -> Self {
        let base = TempDir::new().unwrap();
        let settings = ImportSettings {
            temp_dir: base.path().join("tmp"),
            storage_dir: base.path().join("files"),
            base_url: "http://media.test/files".to_string(),
            media_type_whitelist: vec!["image/png".to_string(), "image/jpeg".to_string()],
            extension_whitelist: vec!["png".to_string(), "jpg".to_string()],
            rows_per_batch: 20,
            logging: LoggingConfig::default(),
        };
        fs::create_dir_all(&settings.temp_dir).unwrap();
        Self { base, settings }
    }

    pub fn validator(&self) -> MediaValidator {
        MediaValidator::from_settings(&self.settings)
    }

    pub fn sandbox(&self) -> PathSandbox {
        PathSandbox::new(self.settings.temp_dir.clone())
    }

    pub fn store(&self) -> Arc<LocalFileStore> {
        Arc::new(LocalFileStore::new(
            self.settings.storage_dir.clone(),
            self.settings.base_url.clone(),
        ))
    }

    pub fn orchestrator(&self) -> ImportOrchestrator {
        ImportOrchestrator::from_settings(&self.settings, self.store())
    }

    pub fn catalog(&self) -> LocalCatalog {
        let ingester = TempFileIngester::new(
            self.settings.temp_dir.clone(),
            self.settings.temp_dir.join("holding"),
            self.validator(),
        );
        LocalCatalog::new(self.store(), ingester)
    }

    /// Fresh job directory inside the temp root
    pub fn job_dir(&self) -> PathBuf {
        self.sandbox().create_fresh_directory().unwrap()
    }

    /// Path of a file outside the temp root
    pub fn upload_path(&self, name: &str) -> PathBuf {
        self.base.path().join(name)
    }

    /// Local file behind a URL handed out by the store
    pub fn stored_file(&self, url: &str) -> PathBuf {
        let relative = url
            .strip_prefix(&format!("{}/", self.settings.base_url))
            .unwrap_or_else(|| panic!("{} is not a store URL", url));
        self.settings.storage_dir.join(relative)
    }
}
