//! Field rules for product records, shared by uploads and edits.

use std::borrow::Cow;
use validator::ValidationError;

pub const MIN_NAME_LENGTH: usize = 3;
pub const MIN_DESCRIPTION_LENGTH: usize = 10;

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

pub fn validate_product_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().chars().count() < MIN_NAME_LENGTH {
        return Err(field_error(
            "name_too_short",
            "Product name must be at least 3 characters",
        ));
    }
    Ok(())
}

pub fn validate_price(price: f64) -> Result<(), ValidationError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(field_error(
            "price_not_positive",
            "Price must be a positive number",
        ));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.trim().chars().count() < MIN_DESCRIPTION_LENGTH {
        return Err(field_error(
            "description_too_short",
            "Description must be at least 10 characters",
        ));
    }
    Ok(())
}

pub fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    if !tags.iter().any(|t| !t.trim().is_empty()) {
        return Err(field_error("tags_empty", "At least one tag is required"));
    }
    if tags.iter().any(|t| t.trim().is_empty()) {
        return Err(field_error("tag_blank", "Tags must not be blank"));
    }
    Ok(())
}

/// At least one non-blank image URL. The per-product maximum is configuration and
/// is checked by the caller.
pub fn validate_image_urls(urls: &[String]) -> Result<(), ValidationError> {
    if urls.is_empty() {
        return Err(field_error(
            "images_empty",
            "At least one image URL is required",
        ));
    }
    if urls.iter().any(|u| u.trim().is_empty()) {
        return Err(field_error("image_url_blank", "Image URLs must not be blank"));
    }
    Ok(())
}

/// Split a comma-separated tag list, trimming entries and dropping empty ones.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// First two whitespace-separated words of the name.
pub fn derive_image_hint(name: &str) -> String {
    name.split_whitespace()
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a price form field. Returns None for anything that is not a finite number.
pub fn parse_price(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
}
