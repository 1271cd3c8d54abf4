use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use farmstand_core::models::{
    AdminListQuery, Product, ProductFilter, ProductListQuery, ProductListResponse,
};
use farmstand_core::AppError;

use crate::error::{ErrorResponse, HttpAppError, ValidatedQuery};
use crate::state::AppState;

/// Public listing of approved products
///
/// Filters by name substring (case-insensitive), inclusive price range, and tags (a
/// product must carry every requested tag). Results are newest first and paged. The
/// response also carries the tag set and price ceiling of all approved products.
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Approved products", body = ProductListResponse),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_products"))]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(query): ValidatedQuery<ProductListQuery>,
) -> Result<Json<ProductListResponse>, HttpAppError> {
    let filter = ProductFilter::try_from(query)?;
    let page = state.products.repository.query_approved(&filter).await?;
    Ok(Json(page))
}

/// A single product. Anything not yet approved is reported as not found.
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "products",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product", body = Product),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(product_id = %id, operation = "get_product"))]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, HttpAppError> {
    let product = state
        .products
        .repository
        .get(&id)
        .await?
        .filter(Product::is_public)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    Ok(Json(product))
}

/// Every product regardless of status, newest first. `status=pending` feeds the
/// approval queue.
#[utoipa::path(
    get,
    path = "/api/admin/products",
    tag = "admin",
    params(AdminListQuery),
    responses(
        (status = 200, description = "Products", body = Vec<Product>),
        (status = 400, description = "Invalid status", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_admin_products"))]
pub async fn list_admin_products(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(query): ValidatedQuery<AdminListQuery>,
) -> Result<Json<Vec<Product>>, HttpAppError> {
    let products = state.products.repository.list_admin(query.status).await?;
    Ok(Json(products))
}
