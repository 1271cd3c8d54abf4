//! Test fixtures: minimal image blobs and product upload forms.

use axum_test::multipart::{MultipartForm, Part};
use bytes::Bytes;

/// Minimal valid 1x1 PNG bytes.
pub fn create_minimal_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
        0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08, 0xD7, 0x63, 0xF8,
        0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x18, 0xDD, 0x8D, 0x89, 0x00, 0x00, 0x00,
        0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}

/// JPEG start/end markers around a few filler bytes. Not decodable; uploads are
/// checked by name and content type only.
pub fn create_test_jpeg() -> Vec<u8> {
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    jpeg.extend_from_slice(b"JFIF\0");
    jpeg.extend_from_slice(&[0u8; 16]);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

pub fn image_part(data: Vec<u8>, file_name: &str, mime_type: &str) -> Part {
    Part::bytes(Bytes::from(data))
        .file_name(file_name)
        .mime_type(mime_type)
}

/// Text fields of a valid product form, without images.
pub fn product_fields(name: &str, price: &str, tags: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("name", name.to_string())
        .add_text("price", price.to_string())
        .add_text("description", format!("Fresh {} from the farm", name.to_lowercase()))
        .add_text("tags", tags.to_string())
}

/// A valid product form carrying one JPEG image.
pub fn product_form(name: &str, price: &str, tags: &str) -> MultipartForm {
    product_fields(name, price, tags).add_part(
        "images",
        image_part(create_test_jpeg(), "produce.jpg", "image/jpeg"),
    )
}
