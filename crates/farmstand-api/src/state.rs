//! Application state shared by every handler.

use farmstand_core::validation::ImageValidator;
use farmstand_db::ProductRepository;
use farmstand_storage::ImageStorage;
use std::sync::Arc;

/// Product store, image storage, and upload limits.
#[derive(Clone)]
pub struct ProductState {
    pub repository: ProductRepository,
    pub storage: Arc<dyn ImageStorage>,
    pub image_validator: ImageValidator,
    pub max_images_per_product: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub products: ProductState,
}
