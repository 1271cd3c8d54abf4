use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::product::{
    derive_image_hint, validate_description, validate_image_urls, validate_price,
    validate_product_name, validate_tags,
};

/// Approval status controlling public visibility
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Pending,
    Approved,
    Rejected,
}

impl Display for ProductStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ProductStatus::Pending => write!(f, "pending"),
            ProductStatus::Approved => write!(f, "approved"),
            ProductStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// A product record as persisted in the store file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub tags: Vec<String>,
    pub description: String,
    pub image_urls: Vec<String>,
    pub image_hint: String,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn is_public(&self) -> bool {
        self.status == ProductStatus::Approved
    }

    /// Apply a partial update. Fields absent from the update keep their current value.
    ///
    /// A new name re-derives the image hint unless the update sets one explicitly.
    pub fn apply(&mut self, update: ProductUpdate) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
            if update.image_hint.is_none() {
                self.image_hint = derive_image_hint(&self.name);
            }
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(description) = update.description {
            self.description = description.trim().to_string();
        }
        if let Some(tags) = update.tags {
            self.tags = tags.into_iter().map(|t| t.trim().to_string()).collect();
        }
        if let Some(image_urls) = update.image_urls {
            self.image_urls = image_urls;
        }
        if let Some(image_hint) = update.image_hint {
            self.image_hint = image_hint;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(created_at) = update.created_at {
            self.created_at = created_at;
        }
    }
}

/// Seller-supplied product fields, validated before any image is written
#[derive(Debug, Clone, Validate)]
pub struct ProductDraft {
    #[validate(custom(function = "validate_product_name"))]
    pub name: String,
    #[validate(custom(function = "validate_price"))]
    pub price: f64,
    #[validate(custom(function = "validate_description"))]
    pub description: String,
    #[validate(custom(function = "validate_tags"))]
    pub tags: Vec<String>,
}

impl ProductDraft {
    pub fn with_images(self, image_urls: Vec<String>) -> NewProduct {
        NewProduct {
            name: self.name.trim().to_string(),
            price: self.price,
            description: self.description.trim().to_string(),
            tags: self.tags,
            image_urls,
        }
    }
}

/// A validated product ready to be appended to the store
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub description: String,
    pub tags: Vec<String>,
    pub image_urls: Vec<String>,
}

impl NewProduct {
    /// Build the pending record the store persists.
    pub fn into_product(self, id: String, created_at: DateTime<Utc>) -> Product {
        let image_hint = derive_image_hint(&self.name);
        Product {
            id,
            name: self.name,
            price: self.price,
            tags: self.tags,
            description: self.description,
            image_urls: self.image_urls,
            image_hint,
            status: ProductStatus::Pending,
            created_at,
        }
    }
}

/// Partial update of a product. Only the listed fields are updatable.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProductUpdate {
    #[serde(default)]
    #[validate(custom(function = "validate_product_name"))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_price"))]
    pub price: Option<f64>,
    #[serde(default)]
    #[validate(custom(function = "validate_description"))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_tags"))]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    #[validate(custom(function = "validate_image_urls"))]
    pub image_urls: Option<Vec<String>>,
    #[serde(default)]
    pub image_hint: Option<String>,
    #[serde(default)]
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Request body for the approval endpoint
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveProductRequest {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub status: String,
}

/// Response for create/update/approve operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub message: String,
    pub product: Product,
}

/// Response carrying only a message
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
