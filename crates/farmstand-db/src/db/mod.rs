//! Product persistence
//!
//! `file_store` owns the on-disk JSON array. `product` layers the repository
//! operations (lookups, filtered listing, insert, status change, update, delete)
//! on top of it.
//
// Raw file access
pub mod file_store;
//
// Product repository
pub mod product;

pub use file_store::ProductFile;
pub use product::{ProductRepository, RemovedProduct};
