//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use farmstand_core::Config;

/// Validate critical configuration values
///
/// # Arguments
/// * `config` - Application configuration to validate
///
/// # Returns
/// Ok(()) if validation passes, Err with details if validation fails
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production. \
            Set specific allowed origins via CORS_ORIGINS."
        ));
    }

    if config.http_concurrency_limit() == 0 {
        return Err(anyhow::anyhow!("HTTP concurrency limit cannot be 0"));
    }

    if config.request_timeout_secs() == 0 {
        return Err(anyhow::anyhow!("Request timeout cannot be 0"));
    }

    // The upload directory is served publicly
    if config.products_file().starts_with(config.upload_dir()) {
        return Err(anyhow::anyhow!(
            "PRODUCTS_FILE must not live inside the public UPLOAD_DIR"
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use farmstand_core::{BaseConfig, MarketplaceConfig};

    fn config(environment: &str, cors: &str, products_file: &str) -> Config {
        Config(Box::new(MarketplaceConfig {
            base: BaseConfig {
                server_port: 4000,
                cors_origins: vec![cors.to_string()],
                environment: environment.to_string(),
                http_concurrency_limit: 100,
                request_timeout_secs: 30,
            },
            products_file: products_file.into(),
            upload_dir: "public/images/uploads".into(),
            upload_url_prefix: "/images/uploads".to_string(),
            max_image_size_bytes: 5_000_000,
            max_images_per_product: 5,
            allowed_image_extensions: vec!["jpg".to_string()],
            allowed_image_content_types: vec!["image/jpeg".to_string()],
        }))
    }

    #[test]
    fn test_development_wildcard_cors_allowed() {
        assert!(validate_config(&config("development", "*", "data/products.json")).is_ok());
    }

    #[test]
    fn test_production_wildcard_cors_rejected() {
        assert!(validate_config(&config("production", "*", "data/products.json")).is_err());
        assert!(validate_config(&config(
            "production",
            "https://farmstand.example",
            "data/products.json"
        ))
        .is_ok());
    }

    #[test]
    fn test_store_inside_upload_dir_rejected() {
        assert!(validate_config(&config(
            "development",
            "*",
            "public/images/uploads/products.json"
        ))
        .is_err());
    }
}
