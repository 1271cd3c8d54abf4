//! Multipart parsing for product uploads

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use farmstand_core::AppError;

/// Name of the repeated file field carrying product images
pub const IMAGE_FIELD: &str = "images";

/// One image part as received, before validation
#[derive(Debug)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Raw text fields and image parts of a product upload form
#[derive(Debug, Default)]
pub struct ProductForm {
    pub name: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub images: Vec<ImageUpload>,
}

impl ProductForm {
    /// Value of a required text field, rejecting missing or blank ones.
    pub fn required(value: &Option<String>, field: &str) -> Result<String, AppError> {
        value
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidInput(format!("Missing required field: {}", field)))
    }
}

fn multipart_error(err: MultipartError, what: &str) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Request body too large: {}", err.body_text()))
    } else {
        AppError::InvalidInput(format!("Failed to read {}: {}", what, err.body_text()))
    }
}

/// Read the whole product form. More than `max_images` image parts is rejected as soon
/// as the extra part is seen.
pub async fn read_product_form(
    mut multipart: Multipart,
    max_images: usize,
) -> Result<ProductForm, AppError> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "multipart"))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == IMAGE_FIELD {
            if form.images.len() >= max_images {
                return Err(AppError::InvalidInput(format!(
                    "Too many images: at most {} allowed",
                    max_images
                )));
            }

            let filename = field
                .file_name()
                .map(|s| s.to_string())
                .unwrap_or_default();
            let content_type = field
                .content_type()
                .map(|s| normalize_mime_type(s).to_lowercase())
                .unwrap_or_else(|| "application/octet-stream".to_string());

            let data = field
                .bytes()
                .await
                .map_err(|e| multipart_error(e, "image data"))?;

            // Browsers send an empty part when no file was picked
            if filename.is_empty() && data.is_empty() {
                continue;
            }

            form.images.push(ImageUpload {
                filename,
                content_type,
                data: data.to_vec(),
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| multipart_error(e, "form field"))?;

        match field_name.as_str() {
            "name" => form.name = Some(value),
            "price" => form.price = Some(value),
            "description" => form.description = Some(value),
            "tags" => form.tags = Some(value),
            other => tracing::debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    Ok(form)
}

/// Normalize MIME type by stripping parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
pub fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}
