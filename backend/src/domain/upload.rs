//! Uploaded diary images.
//!
//! Accepted images are stored on disk under a randomized filename that
//! keeps the original extension; the stored name is what a diary post
//! references.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use uuid::Uuid;

/// An image payload received from a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedImage {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("only image uploads are accepted")]
    NotAnImage,
    #[error("failed to store uploaded image")]
    Io(#[from] io::Error),
}

/// Writes accepted images into the upload directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating upload directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Validate the payload is an image and write it out; returns the
    /// stored filename.
    pub fn store(&self, image: &UploadedImage) -> Result<String, UploadError> {
        let is_image = image
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"));
        if !is_image {
            return Err(UploadError::NotAnImage);
        }

        let stem = Uuid::new_v4().simple().to_string();
        let filename = match extension_of(image.filename.as_deref()) {
            Some(ext) => format!("{stem}.{ext}"),
            None => stem,
        };
        fs::write(self.dir.join(&filename), &image.bytes)?;
        Ok(filename)
    }
}

fn extension_of(filename: Option<&str>) -> Option<String> {
    let ext = Path::new(filename?).extension()?.to_str()?;
    (!ext.is_empty()).then(|| ext.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn image(filename: Option<&str>, content_type: Option<&str>) -> UploadedImage {
        UploadedImage {
            filename: filename.map(str::to_string),
            content_type: content_type.map(str::to_string),
            bytes: vec![0xff, 0xd8, 0xff],
        }
    }

    #[test]
    fn test_store_keeps_original_extension() {
        let dir = tempdir().unwrap();
        let store = ImageStore::new(dir.path().to_path_buf()).unwrap();

        let filename = store.store(&image(Some("photo.JPG"), Some("image/jpeg"))).unwrap();
        assert!(filename.ends_with(".JPG"));
        // hyphenless uuid stem
        assert_eq!(filename.len(), 32 + 4);
        assert!(dir.path().join(&filename).exists());
    }

    #[test]
    fn test_store_without_original_filename_has_no_extension() {
        let dir = tempdir().unwrap();
        let store = ImageStore::new(dir.path().to_path_buf()).unwrap();

        let filename = store.store(&image(None, Some("image/png"))).unwrap();
        assert_eq!(filename.len(), 32);
        assert!(!filename.contains('.'));
    }

    #[test]
    fn test_store_rejects_non_image_content_type() {
        let dir = tempdir().unwrap();
        let store = ImageStore::new(dir.path().to_path_buf()).unwrap();

        let result = store.store(&image(Some("notes.txt"), Some("text/plain")));
        assert!(matches!(result, Err(UploadError::NotAnImage)));
        let result = store.store(&image(Some("photo.jpg"), None));
        assert!(matches!(result, Err(UploadError::NotAnImage)));
    }

    #[test]
    fn test_store_generates_distinct_filenames() {
        let dir = tempdir().unwrap();
        let store = ImageStore::new(dir.path().to_path_buf()).unwrap();

        let a = store.store(&image(Some("a.png"), Some("image/png"))).unwrap();
        let b = store.store(&image(Some("b.png"), Some("image/png"))).unwrap();
        assert_ne!(a, b);
    }
}
