//! Image storage abstraction
//!
//! Product images are addressed by a flat storage key (`{uuid}.{ext}`) and exposed
//! publicly under a URL prefix. Backends translate between the two.

use async_trait::async_trait;
use thiserror::Error;

/// Failures of an image storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not store image: {0}")]
    UploadFailed(String),

    #[error("could not remove image: {0}")]
    DeleteFailed(String),

    #[error("rejected image key: {0}")]
    InvalidKey(String),

    #[error("image storage misconfigured: {0}")]
    ConfigError(String),

    #[error("image storage not writable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Store an image under a freshly generated key and return `(storage_key, public_url)`.
    ///
    /// The caller-supplied filename is never used, so two uploads can never overwrite
    /// each other.
    async fn upload(
        &self,
        extension: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<(String, String)>;

    /// Delete an image. Deleting a missing image succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Confirm a new image could be stored right now. Leaves nothing behind.
    async fn check_writable(&self) -> StorageResult<()>;

    /// Map a public URL produced by this backend back to its storage key.
    ///
    /// Returns `None` for URLs this backend does not own (external links, other prefixes).
    fn key_from_url(&self, url: &str) -> Option<String>;
}
