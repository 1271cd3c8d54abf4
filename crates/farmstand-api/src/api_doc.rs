//! OpenAPI documentation, served at `/api/openapi.json` and viewable at `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use farmstand_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Farmstand API",
        version = "0.1.0",
        description = "Produce marketplace API. Sellers upload products with images, an admin approves or rejects them, and approved products are listed publicly with filters."
    ),
    paths(
        // Public
        handlers::product_upload::create_product,
        handlers::product_get::list_products,
        handlers::product_get::get_product,
        // Admin
        handlers::approval::approve_product,
        handlers::product_update::update_product,
        handlers::product_delete::delete_product,
        handlers::product_get::list_admin_products,
    ),
    components(
        schemas(
            models::Product,
            models::ProductStatus,
            models::ProductUpdate,
            models::ApproveProductRequest,
            models::ProductResponse,
            models::MessageResponse,
            models::ProductListResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "products", description = "Product submission and public listing"),
        (name = "admin", description = "Approval queue and product management")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
