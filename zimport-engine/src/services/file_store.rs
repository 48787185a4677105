//! Local directory file store

use crate::error::StoreError;
use crate::types::FileStore;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Stores files under a base directory and serves them from a base URL
///
/// `relative_path` must be a non-empty relative path made of normal
/// components only.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    base_path: PathBuf,
    base_uri: String,
}

impl LocalFileStore {
    pub fn new(base_path: impl Into<PathBuf>, base_uri: impl Into<String>) -> Self {
        let base_uri: String = base_uri.into();
        Self {
            base_path: base_path.into(),
            base_uri: base_uri.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Filesystem location of a stored file
    pub fn local_path(&self, relative_path: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(relative_path);
        let valid = !relative_path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(StoreError::InvalidPath(relative_path.to_string()));
        }
        Ok(self.base_path.join(relative))
    }
}

impl FileStore for LocalFileStore {
    fn put(&self, source: &Path, relative_path: &str) -> Result<(), StoreError> {
        let destination = self.local_path(relative_path)?;
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source, &destination)?;

        tracing::debug!(
            source = %source.display(),
            destination = %destination.display(),
            "Stored file"
        );
        Ok(())
    }

    fn uri(&self, relative_path: &str) -> String {
        format!("{}/{}", self.base_uri, relative_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_put_and_uri() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("in.txt");
        fs::write(&source, b"data").unwrap();
        let store = LocalFileStore::new(temp.path().join("files"), "http://example.test/files/");

        store.put(&source, "original/abc.txt").unwrap();

        assert_eq!(fs::read(temp.path().join("files/original/abc.txt")).unwrap(), b"data");
        assert_eq!(store.uri("original/abc.txt"), "http://example.test/files/original/abc.txt");
    }

    #[test]
    fn test_rejects_escaping_paths() {
        let store = LocalFileStore::new("/srv/files", "http://h");
        assert!(matches!(store.local_path("../etc/passwd"), Err(StoreError::InvalidPath(_))));
        assert!(matches!(store.local_path("/etc/passwd"), Err(StoreError::InvalidPath(_))));
        assert!(matches!(store.local_path(""), Err(StoreError::InvalidPath(_))));
        assert_eq!(store.local_path("a/b.png").unwrap(), PathBuf::from("/srv/files/a/b.png"));
    }
}
