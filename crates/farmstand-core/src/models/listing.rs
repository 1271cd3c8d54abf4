use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::product::{Product, ProductStatus};
use crate::error::AppError;
use crate::validation::product::parse_tags;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PER_PAGE: usize = 10;
pub const MAX_PER_PAGE: usize = 100;

/// Query string accepted by the public listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// Case-insensitive substring of the product name
    pub q: Option<String>,
    /// Inclusive lower price bound
    pub min_price: Option<f64>,
    /// Inclusive upper price bound
    pub max_price: Option<f64>,
    /// Comma-separated tags; a product must carry all of them
    pub tags: Option<String>,
    /// Page number, starting at 1
    pub page: Option<usize>,
    /// Page size (1-100)
    pub per_page: Option<usize>,
}

/// Query string accepted by the admin listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminListQuery {
    pub status: Option<ProductStatus>,
}

/// A validated filter over approved products.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFilter {
    pub name_contains: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub tags: Vec<String>,
    pub page: usize,
    pub per_page: usize,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            name_contains: None,
            min_price: None,
            max_price: None,
            tags: Vec::new(),
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl TryFrom<ProductListQuery> for ProductFilter {
    type Error = AppError;

    fn try_from(query: ProductListQuery) -> Result<Self, Self::Error> {
        let page = query.page.unwrap_or(DEFAULT_PAGE);
        if page == 0 {
            return Err(AppError::InvalidInput(
                "page must be at least 1".to_string(),
            ));
        }

        let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE);
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(AppError::InvalidInput(format!(
                "perPage must be between 1 and {}",
                MAX_PER_PAGE
            )));
        }

        for bound in [query.min_price, query.max_price].into_iter().flatten() {
            if !bound.is_finite() || bound < 0.0 {
                return Err(AppError::InvalidInput(
                    "Price bounds must be non-negative numbers".to_string(),
                ));
            }
        }

        if let (Some(min), Some(max)) = (query.min_price, query.max_price) {
            if min > max {
                return Err(AppError::InvalidInput(
                    "minPrice cannot be greater than maxPrice".to_string(),
                ));
            }
        }

        let name_contains = query
            .q
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());

        Ok(Self {
            name_contains,
            min_price: query.min_price,
            max_price: query.max_price,
            tags: query.tags.as_deref().map(parse_tags).unwrap_or_default(),
            page,
            per_page,
        })
    }
}

impl ProductFilter {
    /// Whether an approved product passes every active criterion.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(needle) = &self.name_contains {
            if !product.name.to_lowercase().contains(needle) {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if product.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if product.price > max {
                return false;
            }
        }
        self.tags.iter().all(|tag| product.has_tag(tag))
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }

    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.per_page)
    }
}

/// One page of the public listing plus the facets the storefront needs
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    /// Distinct tags across all approved products, in first-seen order
    pub tags: Vec<String>,
    /// Highest approved price rounded up, 0 when nothing is approved
    pub max_price: f64,
}
