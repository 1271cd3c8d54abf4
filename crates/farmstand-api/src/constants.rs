//! API constants

/// API base path prefix
pub const API_PREFIX: &str = "/api";

/// Path of the served OpenAPI document
pub const OPENAPI_PATH: &str = "/api/openapi.json";
