//! Local filesystem storage for uploads.
//!
//! Files are written below the static directory, which the router serves at
//! `/static`. Callers keep the public URL; [`FileStore`] maps it back to a
//! path when a file has to be read or removed.

use std::io::ErrorKind;
use std::path::PathBuf;

use rentora_core::uploads::{public_url, relative_path_of, stored_name, UploadKind};

use crate::error::{AppError, AppResult};

/// Upload storage rooted at the static directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store `data` under a fresh unique name and return its public URL.
    pub async fn save(&self, kind: UploadKind, ext: &str, data: &[u8]) -> AppResult<String> {
        self.save_as(kind, &stored_name(ext), data).await
    }

    /// Store `data` under a fixed file name, overwriting any previous file.
    pub async fn save_as(
        &self,
        kind: UploadKind,
        file_name: &str,
        data: &[u8],
    ) -> AppResult<String> {
        let dir = self.root.join(kind.subdir());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to create upload dir: {e}")))?;

        let path = dir.join(file_name);
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to write upload: {e}")))?;

        tracing::debug!(path = %path.display(), bytes = data.len(), "Stored upload");
        Ok(public_url(kind, file_name))
    }

    /// Filesystem path for a URL produced by this store.
    pub fn path_of(&self, url: &str) -> Option<PathBuf> {
        relative_path_of(url).map(|rel| self.root.join(rel))
    }

    /// Read a stored file as UTF-8 text. `None` when the file is missing.
    pub async fn read_text(&self, url: &str) -> AppResult<Option<String>> {
        let Some(path) = self.path_of(url) else {
            return Ok(None);
        };
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::InternalError(format!(
                "Failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    /// Remove the file behind `url`. Failures are logged, never returned.
    pub async fn remove(&self, url: &str) {
        let Some(path) = self.path_of(url) else {
            tracing::warn!(url, "Refusing to remove file outside the static directory");
            return;
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "Removed file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "File already gone");
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove file");
            }
        }
    }

    /// Best-effort removal of several files.
    pub async fn remove_all(&self, urls: &[String]) {
        for url in urls {
            self.remove(url).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_read_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let url = store
            .save_as(UploadKind::Document, "terms.txt", b"Be nice.")
            .await
            .unwrap();
        assert_eq!(url, "/static/docs/terms.txt");
        assert!(dir.path().join("docs/terms.txt").exists());
        assert_eq!(store.read_text(&url).await.unwrap().as_deref(), Some("Be nice."));

        store.remove(&url).await;
        assert!(!dir.path().join("docs/terms.txt").exists());
        assert!(store.read_text(&url).await.unwrap().is_none());
        // Removing twice is harmless.
        store.remove(&url).await;
    }

    #[tokio::test]
    async fn unique_names_per_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let a = store.save(UploadKind::RentalImage, "png", b"a").await.unwrap();
        let b = store.save(UploadKind::RentalImage, "png", b"b").await.unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("/static/rentals/") && a.ends_with(".png"));
    }

    #[tokio::test]
    async fn remove_all_skips_missing_and_foreign() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let kept = store.save(UploadKind::RentalPdf, "pdf", b"%PDF").await.unwrap();
        let image = store.save(UploadKind::RentalImage, "png", b"a").await.unwrap();
        let urls = vec![
            image.clone(),
            "/static/rentals/never-written.png".to_string(),
            "https://cdn.example.com/a.png".to_string(),
        ];
        store.remove_all(&urls).await;

        assert!(!store.path_of(&image).unwrap().exists());
        assert!(store.path_of(&kept).unwrap().exists());
    }

    #[test]
    fn foreign_urls_have_no_path() {
        let store = FileStore::new("/srv/static");
        assert!(store.path_of("https://cdn.example.com/a.png").is_none());
        assert!(store.path_of("/static/../etc/passwd").is_none());
        assert_eq!(
            store.path_of("/static/icons/a.svg"),
            Some(PathBuf::from("/srv/static/icons/a.svg"))
        );
    }
}
