//! Whole-file JSON persistence for the product collection.

use farmstand_core::{models::Product, AppError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// The JSON file holding every product record as one array.
///
/// `ProductFile` does no locking of its own; callers serialize access (see
/// `ProductRepository`).
#[derive(Clone, Debug)]
pub struct ProductFile {
    path: PathBuf,
}

impl ProductFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole store. A missing file is an empty store.
    pub async fn load(&self) -> Result<Vec<Product>, AppError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "Product file missing, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(AppError::Store(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&raw).map_err(|e| {
            AppError::Store(format!("failed to parse {}: {}", self.path.display(), e))
        })
    }

    /// Replace the whole store.
    ///
    /// The new content is written to a sibling temp file, synced, and renamed over the
    /// target, so readers see either the old or the new array.
    pub async fn save_all(&self, products: &[Product]) -> Result<(), AppError> {
        let start = std::time::Instant::now();

        let json = serde_json::to_string_pretty(products)
            .map_err(|e| AppError::Store(format!("failed to serialize products: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Store(format!(
                    "failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let tmp_path = self.temp_path();
        let write_result = async {
            let mut file = fs::File::create(&tmp_path).await?;
            file.write_all(json.as_bytes()).await?;
            file.sync_all().await?;
            fs::rename(&tmp_path, &self.path).await
        }
        .await;

        if let Err(e) = write_result {
            if let Err(cleanup) = fs::remove_file(&tmp_path).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    tracing::warn!(
                        path = %tmp_path.display(),
                        error = %cleanup,
                        "Failed to remove temporary product file"
                    );
                }
            }
            return Err(AppError::Store(format!(
                "failed to write {}: {}",
                self.path.display(),
                e
            )));
        }

        tracing::debug!(
            path = %self.path.display(),
            count = products.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Product file written"
        );

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "products.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
