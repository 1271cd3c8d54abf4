use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use farmstand_core::models::{ProductResponse, ProductUpdate};
use farmstand_core::AppError;
use validator::Validate;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Partially update a product
///
/// Only the fields present in the body change. Unknown fields (including `id`) are
/// rejected. A new name re-derives the image hint unless `imageHint` is also given.
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "admin",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    request_body = ProductUpdate,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid update", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, update), fields(product_id = %id, operation = "update_product"))]
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(update): ValidatedJson<ProductUpdate>,
) -> Result<Json<ProductResponse>, HttpAppError> {
    update.validate()?;

    let max_images = state.products.max_images_per_product;
    if let Some(urls) = &update.image_urls {
        if urls.len() > max_images {
            return Err(AppError::InvalidInput(format!(
                "Too many images: at most {} allowed",
                max_images
            ))
            .into());
        }
    }

    let product = state
        .products
        .repository
        .update(&id, update)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(ProductResponse {
        message: "Product updated successfully".to_string(),
        product,
    }))
}
