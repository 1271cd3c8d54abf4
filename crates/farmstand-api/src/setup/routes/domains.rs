//! Domain route groups (public product routes, admin routes).

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

pub fn product_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/products", API_PREFIX),
            post(handlers::product_upload::create_product)
                .get(handlers::product_get::list_products),
        )
        .route(
            &format!("{}/products/{{id}}", API_PREFIX),
            get(handlers::product_get::get_product)
                .put(handlers::product_update::update_product)
                .delete(handlers::product_delete::delete_product),
        )
}

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/approve", API_PREFIX),
            post(handlers::approval::approve_product),
        )
        .route(
            &format!("{}/admin/products", API_PREFIX),
            get(handlers::product_get::list_admin_products),
        )
}
