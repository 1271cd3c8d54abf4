//! Storage key generation and checks.
//!
//! Keys are flat file names of the form `{uuid}.{ext}`. They never contain a path
//! separator or `..`.

use uuid::Uuid;

/// Generate a unique storage key for an image with the given extension.
pub fn generate_image_key(extension: &str) -> String {
    let extension = extension.trim_start_matches('.').to_lowercase();
    format!("{}.{}", Uuid::new_v4(), extension)
}

pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.contains("..")
        && !key.contains('/')
        && !key.contains('\\')
        && !key.starts_with('.')
}
