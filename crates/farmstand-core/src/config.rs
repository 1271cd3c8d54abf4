//! Configuration module
//!
//! This module provides configuration structures for the API: server settings, the product
//! store location, and image upload limits.

use std::env;
use std::path::PathBuf;

// Common constants
const SERVER_PORT: u16 = 4000;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Server-level configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub http_concurrency_limit: usize,
    pub request_timeout_secs: u64,
}

/// Marketplace configuration (store file, upload directory, image limits)
#[derive(Clone, Debug)]
pub struct MarketplaceConfig {
    pub base: BaseConfig,
    pub products_file: PathBuf,
    pub upload_dir: PathBuf,
    pub upload_url_prefix: String,
    pub max_image_size_bytes: usize,
    pub max_images_per_product: usize,
    pub allowed_image_extensions: Vec<String>,
    pub allowed_image_content_types: Vec<String>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<MarketplaceConfig>);

impl Config {
    fn as_marketplace(&self) -> &MarketplaceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_environment(&self.as_marketplace().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = MarketplaceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_marketplace().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_marketplace().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_marketplace().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_marketplace().base.environment
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.as_marketplace().base.http_concurrency_limit
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.as_marketplace().base.request_timeout_secs
    }

    pub fn products_file(&self) -> &PathBuf {
        &self.as_marketplace().products_file
    }

    pub fn upload_dir(&self) -> &PathBuf {
        &self.as_marketplace().upload_dir
    }

    pub fn upload_url_prefix(&self) -> &str {
        &self.as_marketplace().upload_url_prefix
    }

    pub fn max_image_size_bytes(&self) -> usize {
        self.as_marketplace().max_image_size_bytes
    }

    pub fn max_images_per_product(&self) -> usize {
        self.as_marketplace().max_images_per_product
    }

    pub fn allowed_image_extensions(&self) -> &[String] {
        &self.as_marketplace().allowed_image_extensions
    }

    pub fn allowed_image_content_types(&self) -> &[String] {
        &self.as_marketplace().allowed_image_content_types
    }

    /// Upper bound for a whole upload request: every image at the size limit plus form overhead.
    pub fn max_request_body_bytes(&self) -> usize {
        const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;
        self.max_image_size_bytes()
            .saturating_mul(self.max_images_per_product())
            .saturating_add(FORM_OVERHEAD_BYTES)
    }
}

fn is_production_environment(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

fn comma_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl MarketplaceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        const MAX_IMAGE_SIZE_BYTES: usize = 5_000_000;
        const MAX_IMAGES_PER_PRODUCT: usize = 5;

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_environment(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            http_concurrency_limit: env::var("HTTP_CONCURRENCY_LIMIT")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(HTTP_CONCURRENCY_LIMIT)
                .max(1),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(REQUEST_TIMEOUT_SECS)
                .max(1),
        };

        let config = MarketplaceConfig {
            base,
            products_file: env::var("PRODUCTS_FILE")
                .unwrap_or_else(|_| "data/products.json".to_string())
                .into(),
            upload_dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "public/images/uploads".to_string())
                .into(),
            upload_url_prefix: env::var("UPLOAD_URL_PREFIX")
                .unwrap_or_else(|_| "/images/uploads".to_string())
                .trim_end_matches('/')
                .to_string(),
            max_image_size_bytes: env::var("MAX_IMAGE_SIZE_BYTES")
                .unwrap_or_else(|_| MAX_IMAGE_SIZE_BYTES.to_string())
                .parse()
                .unwrap_or(MAX_IMAGE_SIZE_BYTES),
            max_images_per_product: env::var("MAX_IMAGES_PER_PRODUCT")
                .unwrap_or_else(|_| MAX_IMAGES_PER_PRODUCT.to_string())
                .parse()
                .unwrap_or(MAX_IMAGES_PER_PRODUCT),
            allowed_image_extensions: comma_list(
                &env::var("ALLOWED_IMAGE_EXTENSIONS")
                    .unwrap_or_else(|_| "jpg,jpeg,png,webp".to_string()),
            ),
            allowed_image_content_types: comma_list(
                &env::var("ALLOWED_IMAGE_CONTENT_TYPES")
                    .unwrap_or_else(|_| "image/jpeg,image/png,image/webp".to_string()),
            ),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.products_file.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("PRODUCTS_FILE must not be empty"));
        }

        if self.upload_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_DIR must not be empty"));
        }

        if !self.upload_url_prefix.starts_with('/') {
            return Err(anyhow::anyhow!(
                "UPLOAD_URL_PREFIX must start with '/' (got '{}')",
                self.upload_url_prefix
            ));
        }

        if self.max_image_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_IMAGE_SIZE_BYTES must be greater than 0"));
        }

        if self.max_images_per_product == 0 {
            return Err(anyhow::anyhow!(
                "MAX_IMAGES_PER_PRODUCT must be greater than 0"
            ));
        }

        if self.allowed_image_extensions.is_empty() || self.allowed_image_content_types.is_empty()
        {
            return Err(anyhow::anyhow!(
                "ALLOWED_IMAGE_EXTENSIONS and ALLOWED_IMAGE_CONTENT_TYPES must not be empty"
            ));
        }

        Ok(())
    }
}
