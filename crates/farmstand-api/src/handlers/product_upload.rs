use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Extension, Json,
};
use farmstand_core::models::{ProductDraft, ProductResponse};
use farmstand_core::validation::{parse_price, parse_tags};
use farmstand_core::AppError;
use farmstand_storage::ImageStorage;
use validator::Validate;

use crate::error::{ErrorResponse, HttpAppError};
use crate::middleware::RequestId;
use crate::state::AppState;
use crate::utils::upload::{read_product_form, ProductForm};

/// Validated image ready to be written
struct CheckedImage {
    extension: String,
    content_type: String,
    data: Vec<u8>,
}

/// Best-effort removal of images written for a request that failed afterwards.
async fn discard_images(storage: &dyn ImageStorage, keys: &[String]) {
    for key in keys {
        if let Err(cleanup_err) = storage.delete(key).await {
            tracing::warn!(
                error = %cleanup_err,
                storage_key = %key,
                "Failed to clean up image after failed upload"
            );
        }
    }
}

/// Upload a new product
///
/// Validates every field and image before anything is written. Images are stored under
/// generated names and the product is appended to the store with status `pending`.
/// If storing an image or the product fails, images already written for this request
/// are removed again.
///
/// # Errors
/// - `AppError::InvalidInput` - Missing or malformed field, bad image type, wrong image count
/// - `AppError::PayloadTooLarge` - An image exceeds the size limit
/// - `AppError::Storage` - Writing an image failed
/// - `AppError::Store` - Reading or writing the product file failed
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "products",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Fields: name, price, description, tags (comma-separated), images (1-5 files)"),
    responses(
        (status = 201, description = "Product added", body = ProductResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "Image too large", body = ErrorResponse),
        (status = 500, description = "Store or storage failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request_id, multipart),
    fields(request_id = %request_id.0, operation = "create_product")
)]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ProductResponse>), HttpAppError> {
    let products = &state.products;
    let form = read_product_form(multipart, products.max_images_per_product).await?;

    let name = ProductForm::required(&form.name, "name")?;
    let raw_price = ProductForm::required(&form.price, "price")?;
    let description = ProductForm::required(&form.description, "description")?;
    let raw_tags = ProductForm::required(&form.tags, "tags")?;

    let price = parse_price(&raw_price).ok_or_else(|| {
        AppError::InvalidInput(format!("Price must be a number (got '{}')", raw_price.trim()))
    })?;

    let draft = ProductDraft {
        name,
        price,
        description,
        tags: parse_tags(&raw_tags),
    };
    draft.validate()?;

    if form.images.is_empty() {
        return Err(AppError::InvalidInput("At least one image is required".to_string()).into());
    }

    let mut checked = Vec::with_capacity(form.images.len());
    for image in form.images {
        let extension = products.image_validator.validate_all(
            &image.filename,
            &image.content_type,
            image.data.len(),
        )?;
        checked.push(CheckedImage {
            extension,
            content_type: image.content_type,
            data: image.data,
        });
    }

    let mut stored_keys: Vec<String> = Vec::with_capacity(checked.len());
    let mut image_urls: Vec<String> = Vec::with_capacity(checked.len());
    for image in checked {
        match products
            .storage
            .upload(&image.extension, &image.content_type, image.data)
            .await
        {
            Ok((key, url)) => {
                stored_keys.push(key);
                image_urls.push(url);
            }
            Err(e) => {
                discard_images(products.storage.as_ref(), &stored_keys).await;
                return Err(e.into());
            }
        }
    }

    let product = match products
        .repository
        .insert(draft.with_images(image_urls))
        .await
    {
        Ok(product) => product,
        Err(e) => {
            discard_images(products.storage.as_ref(), &stored_keys).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        product_id = %product.id,
        image_count = product.image_urls.len(),
        "Product submitted for approval"
    );

    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            message: "Product added successfully".to_string(),
            product,
        }),
    ))
}
