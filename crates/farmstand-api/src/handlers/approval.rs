use std::sync::Arc;

use axum::{extract::State, Json};
use farmstand_core::models::{ApproveProductRequest, ProductResponse, ProductStatus};
use farmstand_core::AppError;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Approve or reject a product
///
/// Only the exact values `approved` and `rejected` are accepted, and `productId` must
/// match a stored id exactly. Any status may be set from any other,
/// and setting the current status again succeeds without change.
#[utoipa::path(
    post,
    path = "/api/approve",
    tag = "admin",
    request_body = ApproveProductRequest,
    responses(
        (status = 200, description = "Status updated", body = ProductResponse),
        (status = 400, description = "Invalid productId or status", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(product_id = %request.product_id, operation = "approve_product")
)]
pub async fn approve_product(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ApproveProductRequest>,
) -> Result<Json<ProductResponse>, HttpAppError> {
    let status = match request.status.as_str() {
        _ if request.product_id.is_empty() => None,
        "approved" => Some(ProductStatus::Approved),
        "rejected" => Some(ProductStatus::Rejected),
        _ => None,
    }
    .ok_or_else(|| AppError::BadRequest("Invalid productId or status".to_string()))?;

    let product = state
        .products
        .repository
        .set_status(&request.product_id, status)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(ProductResponse {
        message: format!("Product status updated to {}", status),
        product,
    }))
}
