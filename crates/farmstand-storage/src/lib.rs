//! Farmstand Storage Library
//!
//! Storage abstraction for product images and its local filesystem implementation.
//!
//! # Storage key format
//!
//! Every image is stored under a generated flat key `{uuid}.{ext}` and served at
//! `{url_prefix}/{key}`. Keys must not contain `..` or a path separator. Key
//! generation lives in the `keys` module.

pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use local::LocalStorage;
pub use traits::{ImageStorage, StorageError, StorageResult};
