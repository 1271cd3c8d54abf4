//! Repository and state construction

use anyhow::Result;
use farmstand_core::validation::ImageValidator;
use farmstand_core::Config;
use farmstand_db::{ProductFile, ProductRepository};
use farmstand_storage::ImageStorage;
use std::sync::Arc;

use crate::state::{AppState, ProductState};

/// Build the product repository and the shared application state.
pub async fn initialize_services(
    config: &Config,
    storage: Arc<dyn ImageStorage>,
) -> Result<Arc<AppState>> {
    let repository = ProductRepository::new(ProductFile::new(config.products_file().clone()));

    // Surface an unreadable store at startup; requests would fail with 500 anyway
    match repository.list().await {
        Ok(products) => tracing::info!(
            products_file = %config.products_file().display(),
            count = products.len(),
            "Product store loaded"
        ),
        Err(e) => tracing::warn!(
            products_file = %config.products_file().display(),
            error = %e,
            "Product store is not readable"
        ),
    }

    let image_validator = ImageValidator::new(
        config.max_image_size_bytes(),
        config.allowed_image_extensions().to_vec(),
        config.allowed_image_content_types().to_vec(),
    );

    Ok(Arc::new(AppState {
        products: ProductState {
            repository,
            storage,
            image_validator,
            max_images_per_product: config.max_images_per_product(),
        },
    }))
}
