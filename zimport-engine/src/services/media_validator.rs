//! Media file validation
//!
//! A path is acceptable media when it is a regular file whose sniffed
//! content type and whose extension are both whitelisted. Content type comes
//! from magic bytes, never from the file name.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use zimport_common::config::ImportSettings;

/// Content type reported for files whose magic bytes are not recognized
pub const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// Content-type + extension whitelist predicate
#[derive(Debug, Clone)]
pub struct MediaValidator {
    media_types: HashSet<String>,
    extensions: HashSet<String>,
}

impl MediaValidator {
    pub fn new<M, E>(media_types: M, extensions: E) -> Self
    where
        M: IntoIterator<Item = String>,
        E: IntoIterator<Item = String>,
    {
        Self {
            media_types: media_types.into_iter().collect(),
            extensions: extensions.into_iter().collect(),
        }
    }

    pub fn from_settings(settings: &ImportSettings) -> Self {
        Self::new(
            settings.media_type_whitelist.iter().cloned(),
            settings.extension_whitelist.iter().cloned(),
        )
    }

    /// Is `path` an acceptable media asset?
    pub fn is_valid_media(&self, path: &Path) -> bool {
        let is_file = fs::symlink_metadata(path)
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            return false;
        }

        let media_type = match sniff_media_type(path) {
            Ok(media_type) => media_type,
            Err(e) => {
                tracing::warn!("Error sniffing {}: {}", path.display(), e);
                return false;
            }
        };
        if !self.media_types.contains(media_type) {
            return false;
        }

        match split_file_name(path).1 {
            Some(ext) => self.extensions.contains(ext),
            None => false,
        }
    }
}

/// Sniff a file's content type from its leading bytes
pub fn sniff_media_type(path: &Path) -> std::io::Result<&'static str> {
    Ok(infer::get_from_path(path)?
        .map(|kind| kind.mime_type())
        .unwrap_or(UNKNOWN_MEDIA_TYPE))
}

/// Split a file name at its last `.` into (stem, extension)
///
/// `photo.final.JPG` → (`photo.final`, `JPG`); `README` → (`README`, None);
/// `.hidden` → (``, `hidden`).
pub fn split_file_name(path: &Path) -> (&str, Option<&str>) {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (name, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F', 0];

    fn validator() -> MediaValidator {
        MediaValidator::new(
            vec!["image/png".to_string(), "image/jpeg".to_string()],
            vec!["png".to_string(), "jpg".to_string()],
        )
    }

    #[test]
    fn test_accepts_whitelisted_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("r1.png");
        fs::write(&path, PNG).unwrap();

        assert!(validator().is_valid_media(&path));
    }

    #[test]
    fn test_rejects_missing_file_and_directory() {
        let dir = TempDir::new().unwrap();
        assert!(!validator().is_valid_media(&dir.path().join("nope.png")));
        assert!(!validator().is_valid_media(dir.path()));
    }

    #[test]
    fn test_content_type_wins_over_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fake.png");
        fs::write(&path, b"plain text pretending to be an image").unwrap();

        assert!(!validator().is_valid_media(&path));
    }

    #[test]
    fn test_extension_is_case_sensitive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("r1.JPG");
        fs::write(&path, JPEG).unwrap();

        assert!(!validator().is_valid_media(&path));
    }

    #[test]
    fn test_rejects_file_without_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("r1");
        fs::write(&path, PNG).unwrap();

        assert!(!validator().is_valid_media(&path));
    }

    #[test]
    fn test_rejects_non_whitelisted_type_with_valid_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("r1.png");
        fs::write(&path, JPEG).unwrap();

        let only_png = MediaValidator::new(vec!["image/png".to_string()], vec!["png".to_string()]);
        assert!(!only_png.is_valid_media(&path));
    }

    #[test]
    fn test_unknown_content_is_octet_stream() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, b"hello").unwrap();

        assert_eq!(sniff_media_type(&path).unwrap(), UNKNOWN_MEDIA_TYPE);
    }

    #[test]
    fn test_split_file_name() {
        assert_eq!(split_file_name(Path::new("/a/photo.final.JPG")), ("photo.final", Some("JPG")));
        assert_eq!(split_file_name(Path::new("/a/README")), ("README", None));
        assert_eq!(split_file_name(Path::new(".hidden")), ("", Some("hidden")));
    }
}
