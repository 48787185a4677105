//! Containment-checked filesystem operations under the temp root
//!
//! Every operation first verifies its target lies inside the configured
//! root. A failed check is a logged no-op reported as
//! [`SandboxOutcome::Rejected`], never an error.
//!
//! Containment is lexical: the path must start with the root component by
//! component and must not contain `..`. Symlinks are never followed while
//! recursing; a symlink is visited as a file.

use crate::error::SandboxError;
use std::fs;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;
use walkdir::WalkDir;

/// Result of a sandboxed operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandboxOutcome {
    /// The operation ran
    Applied,
    /// The target was outside the root; nothing was touched
    Rejected,
}

/// Visitor for [`PathSandbox::recurse`]; both methods default to no-ops
pub trait TreeVisitor {
    fn on_directory(&mut self, _path: &Path) -> std::io::Result<()> {
        Ok(())
    }

    fn on_file(&mut self, _path: &Path) -> std::io::Result<()> {
        Ok(())
    }
}

/// Visitor that does nothing
pub struct NoopVisitor;

impl TreeVisitor for NoopVisitor {}

struct DeleteVisitor;

impl TreeVisitor for DeleteVisitor {
    fn on_directory(&mut self, path: &Path) -> std::io::Result<()> {
        fs::remove_dir(path)
    }

    fn on_file(&mut self, path: &Path) -> std::io::Result<()> {
        fs::remove_file(path)
    }
}

struct OpenPermissionsVisitor;

impl OpenPermissionsVisitor {
    fn open_up(path: &Path) -> std::io::Result<()> {
        let metadata = fs::symlink_metadata(path)?;
        if metadata.file_type().is_symlink() {
            return Ok(());
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o777))
        }

        #[cfg(not(unix))]
        {
            let mut permissions = metadata.permissions();
            permissions.set_readonly(false);
            fs::set_permissions(path, permissions)
        }
    }
}

impl TreeVisitor for OpenPermissionsVisitor {
    fn on_directory(&mut self, path: &Path) -> std::io::Result<()> {
        Self::open_up(path)
    }

    fn on_file(&mut self, path: &Path) -> std::io::Result<()> {
        Self::open_up(path)
    }
}

/// Filesystem operations confined to one root directory
#[derive(Debug, Clone)]
pub struct PathSandbox {
    root: PathBuf,
}

impl PathSandbox {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Does `path` lie inside the root?
    pub fn contains(&self, path: &Path) -> bool {
        if path.components().any(|c| matches!(c, Component::ParentDir)) {
            return false;
        }
        path.starts_with(&self.root)
    }

    /// Depth-first walk: children before their directory
    ///
    /// A file target invokes only `on_file`.
    pub fn recurse(
        &self,
        path: &Path,
        visitor: &mut dyn TreeVisitor,
    ) -> Result<SandboxOutcome, SandboxError> {
        if !self.contains(path) {
            tracing::error!(
                path = %path.display(),
                root = %self.root.display(),
                "Refusing filesystem operation outside temp root"
            );
            return Ok(SandboxOutcome::Rejected);
        }

        let walker = WalkDir::new(path)
            .follow_links(false)
            .follow_root_links(false)
            .contents_first(true);
        for entry in walker {
            let entry = entry?;
            let entry_path = entry.path();

            if !self.contains(entry_path) {
                tracing::error!(path = %entry_path.display(), "Skipping entry outside temp root");
                continue;
            }

            let result = if entry.file_type().is_dir() {
                visitor.on_directory(entry_path)
            } else {
                visitor.on_file(entry_path)
            };

            result.map_err(|source| SandboxError::Io {
                path: entry_path.to_path_buf(),
                source,
            })?;
        }

        Ok(SandboxOutcome::Applied)
    }

    /// Make every directory and file under `path` world-writable
    ///
    /// Lets a process running as a different user (e.g. a web server)
    /// read and remove what a job extracted.
    pub fn set_permissions_recursive(&self, path: &Path) -> Result<SandboxOutcome, SandboxError> {
        self.recurse(path, &mut OpenPermissionsVisitor)
    }

    /// Delete every file, then every emptied directory, bottom-up
    pub fn delete_recursive(&self, path: &Path) -> Result<SandboxOutcome, SandboxError> {
        self.recurse(path, &mut DeleteVisitor)
    }

    /// Create a new uniquely named directory inside the root
    pub fn create_fresh_directory(&self) -> Result<PathBuf, SandboxError> {
        fs::create_dir_all(&self.root).map_err(|source| SandboxError::Io {
            path: self.root.clone(),
            source,
        })?;

        let path = self.root.join(format!("zimport{}", Uuid::new_v4().simple()));

        if let Ok(metadata) = fs::symlink_metadata(&path) {
            if metadata.is_dir() {
                self.delete_recursive(&path)?;
            } else {
                fs::remove_file(&path).map_err(|source| SandboxError::Io {
                    path: path.clone(),
                    source,
                })?;
            }
        }

        if let Err(e) = fs::create_dir(&path) {
            tracing::error!(path = %path.display(), error = %e, "mkdir failed");
        }

        if !path.is_dir() {
            return Err(SandboxError::TempDirectoryCreation(path));
        }

        tracing::debug!(path = %path.display(), "Created temp directory");
        Ok(path)
    }
}
