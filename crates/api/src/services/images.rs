//! Image store: uploaded files on the local filesystem.
//!
//! Files are stored as `<root>/<folder>/<uuid>.<ext>` and referenced in
//! the database by the relative `<folder>/<uuid>.<ext>` path, which the
//! server exposes under `/static/`.

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// Errors reported by the image store.
#[derive(Debug, Error)]
pub enum ImageStoreError {
    /// Failed to write the uploaded file.
    #[error("Failed to store image")]
    Save(#[source] std::io::Error),

    /// Failed to delete a stored file.
    #[error("Failed to delete image")]
    Delete(#[source] std::io::Error),

    /// Path escapes the store root.
    #[error("Invalid image path")]
    InvalidPath,
}

/// Filesystem-backed image store.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Create an image store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store's root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store uploaded bytes under `folder`, returning the relative path.
    ///
    /// The stored name is a fresh UUID; only the extension of the client's
    /// file name is kept (sanitized, lowercased).
    ///
    /// # Errors
    ///
    /// Returns `ImageStoreError::Save` if the directory or file cannot be
    /// written.
    pub async fn save(
        &self,
        folder: &str,
        original_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<String, ImageStoreError> {
        let ext = original_name.map_or_else(|| "img".to_owned(), extension_of);
        let file_name = format!("{}.{ext}", Uuid::new_v4());
        let relative = format!("{folder}/{file_name}");

        let dir = self.root.join(folder);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(ImageStoreError::Save)?;
        tokio::fs::write(dir.join(&file_name), bytes)
            .await
            .map_err(ImageStoreError::Save)?;

        Ok(relative)
    }

    /// Delete a stored file by its relative path.
    ///
    /// A file that is already gone counts as deleted.
    ///
    /// # Errors
    ///
    /// Returns `ImageStoreError::InvalidPath` if the path escapes the
    /// store root, `ImageStoreError::Delete` if removal fails.
    pub async fn delete(&self, relative_path: &str) -> Result<(), ImageStoreError> {
        if relative_path.split('/').any(|part| part == "..") {
            return Err(ImageStoreError::InvalidPath);
        }

        match tokio::fs::remove_file(self.root.join(relative_path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ImageStoreError::Delete(e)),
        }
    }

    /// Delete a stored file whose database reference is already gone,
    /// after a replacement or a cascading row delete is committed.
    ///
    /// Best effort: failures are logged, not surfaced, because the
    /// database state is already final.
    pub async fn delete_replaced(&self, relative_path: &str) {
        if let Err(e) = self.delete(relative_path).await {
            tracing::warn!(path = %relative_path, error = %e, "Failed to delete replaced image");
        }
    }
}

/// Sanitized, lowercased extension of an uploaded file name.
fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map_or_else(|| "img".to_owned(), str::to_ascii_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> ImageStore {
        ImageStore::new(std::env::temp_dir().join(format!("bazaar-images-{}", Uuid::new_v4())))
    }

    #[tokio::test]
    async fn test_save_and_delete() {
        let store = temp_store();
        let path = store
            .save("products", Some("photo.PNG"), b"not really a png")
            .await
            .expect("save");

        assert!(path.starts_with("products/"));
        assert!(path.ends_with(".png"));
        assert!(store.root().join(&path).exists());

        store.delete(&path).await.expect("delete");
        assert!(!store.root().join(&path).exists());
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_ok() {
        let store = temp_store();
        store
            .delete("products/does-not-exist.png")
            .await
            .expect("missing file counts as deleted");
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let store = temp_store();
        let err = store
            .delete("../../etc/passwd")
            .await
            .expect_err("must reject");
        assert!(matches!(err, ImageStoreError::InvalidPath));
    }

    #[test]
    fn test_extension_sanitized() {
        assert_eq!(extension_of("a.jpeg"), "jpeg");
        assert_eq!(extension_of("weird.j/pg"), "img");
        assert_eq!(extension_of("noext"), "img");
        assert_eq!(extension_of("dot."), "img");
    }
}
