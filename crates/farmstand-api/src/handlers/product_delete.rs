use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use farmstand_core::models::MessageResponse;
use farmstand_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::middleware::RequestId;
use crate::state::AppState;

/// Delete a product
///
/// The record is removed first. Its images stored under the upload prefix are then
/// deleted unless another product still lists them. Failures there are logged and do
/// not fail the request.
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "admin",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request_id),
    fields(request_id = %request_id.0, product_id = %id, operation = "delete_product")
)]
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, HttpAppError> {
    let removed = state
        .products
        .repository
        .delete(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let storage = &state.products.storage;
    for url in &removed.unreferenced_image_urls {
        let Some(key) = storage.key_from_url(url) else {
            tracing::debug!(url = %url, "Image not in upload directory, leaving it");
            continue;
        };
        if let Err(e) = storage.delete(&key).await {
            tracing::warn!(
                error = %e,
                storage_key = %key,
                "Failed to delete image of removed product"
            );
        }
    }

    Ok(Json(MessageResponse {
        message: "Product deleted successfully".to_string(),
    }))
}
