pub mod approval;
pub mod product_delete;
pub mod product_get;
pub mod product_update;
pub mod product_upload;
