//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p farmstand-api`. Every app gets its own
//! temporary product file and upload directory.

pub mod fixtures;

use axum_test::TestServer;
use farmstand_api::constants;
use farmstand_api::setup::{routes, services, storage};
use farmstand_core::{BaseConfig, Config, MarketplaceConfig};
use std::path::PathBuf;
use tempfile::TempDir;

/// Image size limit used by test apps, small enough to exceed cheaply.
pub const TEST_MAX_IMAGE_SIZE: usize = 64 * 1024;

/// API path prefix for tests (e.g. `/api`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn products_file(&self) -> PathBuf {
        self._temp_dir.path().join("data").join("products.json")
    }

    pub fn upload_dir(&self) -> PathBuf {
        self._temp_dir.path().join("public").join("images").join("uploads")
    }
}

pub fn create_test_config(temp_dir: &TempDir) -> Config {
    Config(Box::new(MarketplaceConfig {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
            http_concurrency_limit: 100,
            request_timeout_secs: 30,
        },
        products_file: temp_dir.path().join("data").join("products.json"),
        upload_dir: temp_dir.path().join("public").join("images").join("uploads"),
        upload_url_prefix: "/images/uploads".to_string(),
        max_image_size_bytes: TEST_MAX_IMAGE_SIZE,
        max_images_per_product: 5,
        allowed_image_extensions: ["jpg", "jpeg", "png", "webp"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        allowed_image_content_types: ["image/jpeg", "image/png", "image/webp"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }))
}

/// Setup test app with an empty (absent) product store.
pub async fn setup_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    build_app(temp_dir).await
}

/// Setup test app whose product file starts with `contents`.
pub async fn setup_test_app_with_store(contents: &str) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let data_dir = temp_dir.path().join("data");
    std::fs::create_dir_all(&data_dir).expect("Failed to create data directory");
    std::fs::write(data_dir.join("products.json"), contents)
        .expect("Failed to write product store");
    build_app(temp_dir).await
}

async fn build_app(temp_dir: TempDir) -> TestApp {
    let config = create_test_config(&temp_dir);

    let storage = storage::setup_storage(&config)
        .await
        .expect("Failed to create local storage");
    let state = services::initialize_services(&config, storage)
        .await
        .expect("Failed to initialize services");
    let app = routes::setup_routes(&config, state)
        .await
        .expect("Failed to setup routes");

    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        _temp_dir: temp_dir,
    }
}
