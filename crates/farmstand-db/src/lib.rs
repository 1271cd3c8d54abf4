//! Farmstand product store
//!
//! File-backed persistence for product records.

pub mod db;

pub use db::{ProductFile, ProductRepository, RemovedProduct};
