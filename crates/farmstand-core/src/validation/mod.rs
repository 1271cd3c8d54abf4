//! Validation modules

pub mod image;
pub mod product;

pub use image::{file_extension, ImageValidator, ValidationError};
pub use product::{derive_image_hint, parse_price, parse_tags};
