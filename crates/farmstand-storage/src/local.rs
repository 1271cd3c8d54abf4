use crate::keys::{generate_image_key, is_valid_key};
use crate::traits::{ImageStorage, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem image storage
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Directory image files are written to (e.g. "public/images/uploads")
    /// * `base_url` - URL prefix the directory is served under (e.g. "/images/uploads")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create upload directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if !is_valid_key(storage_key) {
            return Err(StorageError::InvalidKey(format!(
                "'{}' is not a plain file name",
                storage_key
            )));
        }
        Ok(self.base_path.join(storage_key))
    }

    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

#[async_trait]
impl ImageStorage for LocalStorage {
    async fn upload(
        &self,
        extension: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<(String, String)> {
        let key = generate_image_key(extension);
        let path = self.key_to_path(&key)?;
        let size = data.len();

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let url = self.generate_url(&key);

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image stored"
        );

        Ok((key, url))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image deleted"
        );

        Ok(())
    }

    async fn check_writable(&self) -> StorageResult<()> {
        let marker = self
            .base_path
            .join(format!(".write-check-{}", uuid::Uuid::new_v4()));

        fs::write(&marker, b"ok").await.map_err(|e| {
            StorageError::Unavailable(format!("{}: {}", self.base_path.display(), e))
        })?;
        fs::remove_file(&marker).await.map_err(|e| {
            StorageError::Unavailable(format!("{}: {}", marker.display(), e))
        })
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        let key = url
            .strip_prefix(self.base_url.as_str())?
            .strip_prefix('/')?;
        is_valid_key(key).then(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn storage(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir.join("uploads"), "/images/uploads/".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_writes_file_under_key() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        let data = b"jpeg bytes".to_vec();

        let (key, url) = storage
            .upload("jpg", "image/jpeg", data.clone())
            .await
            .unwrap();

        assert!(key.ends_with(".jpg"));
        assert_eq!(url, format!("/images/uploads/{}", key));
        assert_eq!(
            std::fs::read(dir.path().join("uploads").join(&key)).unwrap(),
            data
        );
    }

    #[tokio::test]
    async fn test_same_extension_never_collides() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let (first, _) = storage.upload("png", "image/png", b"a".to_vec()).await.unwrap();
        let (second, _) = storage.upload("png", "image/png", b"b".to_vec()).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(std::fs::read(storage.base_path().join(&first)).unwrap(), b"a");
        assert_eq!(std::fs::read(storage.base_path().join(&second)).unwrap(), b"b");
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage.delete("../products.json").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_ok() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        assert!(storage.delete("missing.jpg").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let (key, _) = storage
            .upload("webp", "image/webp", b"x".to_vec())
            .await
            .unwrap();
        assert!(storage.base_path().join(&key).exists());

        storage.delete(&key).await.unwrap();
        assert!(!storage.base_path().join(&key).exists());
    }

    #[tokio::test]
    async fn test_check_writable_leaves_no_files() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        storage.check_writable().await.unwrap();
        assert_eq!(std::fs::read_dir(storage.base_path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_check_writable_fails_without_directory() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        std::fs::remove_dir_all(storage.base_path()).unwrap();

        assert!(matches!(
            storage.check_writable().await,
            Err(StorageError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_key_from_url() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        assert_eq!(
            storage.key_from_url("/images/uploads/abc.jpg"),
            Some("abc.jpg".to_string())
        );
        assert_eq!(storage.key_from_url("https://cdn.example.com/abc.jpg"), None);
        assert_eq!(storage.key_from_url("/images/uploads/../data.json"), None);
        assert_eq!(storage.key_from_url("/images/uploadsabc.jpg"), None);
    }
}
