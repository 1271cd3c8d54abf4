//! Image storage setup

use anyhow::{Context, Result};
use farmstand_core::Config;
use farmstand_storage::{ImageStorage, LocalStorage};
use std::sync::Arc;

/// Create the upload directory if needed and return the storage serving it.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn ImageStorage>> {
    let storage = LocalStorage::new(
        config.upload_dir().clone(),
        config.upload_url_prefix().to_string(),
    )
    .await
    .context("Failed to initialize image storage")?;

    tracing::info!(
        upload_dir = %storage.base_path().display(),
        url_prefix = %config.upload_url_prefix(),
        "Image storage initialized"
    );

    Ok(Arc::new(storage))
}
