//! Route configuration and setup.
//!
//! Domain route groups live in [domains](domains); health checks in [health](health).

mod domains;
mod health;

use crate::constants::OPENAPI_PATH;
use crate::middleware::{payload_limit_response, request_id_middleware};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::get,
    Json, Router,
};
use farmstand_core::Config;
use std::sync::Arc;
use std::time::Duration;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub async fn setup_routes(
    config: &Config,
    state: Arc<AppState>,
) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let api_routes = domains::product_routes()
        .merge(domains::admin_routes())
        // Multipart and JSON bodies are bounded by RequestBodyLimitLayer below
        .layer(DefaultBodyLimit::disable());

    let http_concurrency_limit = config.http_concurrency_limit();
    let max_body_bytes = config.max_request_body_bytes();
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        max_body_bytes = max_body_bytes,
        request_timeout_secs = config.request_timeout_secs(),
        "HTTP limits configured"
    );

    let app = api_routes
        .merge(health_routes(state.clone()))
        .with_state(state)
        .route(
            OPENAPI_PATH,
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .nest(
            "/docs",
            utoipa_rapidoc::RapiDoc::new(OPENAPI_PATH).path("/docs").into(),
        )
        .nest_service(config.upload_url_prefix(), ServeDir::new(config.upload_dir()))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs(),
        )))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(axum::middleware::map_response(payload_limit_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware));

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

/// Liveness, readiness, and full health probes
fn health_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/health",
            get({
                let state = state.clone();
                move || async move { health::health_check(state).await }
            }),
        )
        .route("/live", get(health::liveness_check))
        .route(
            "/ready",
            get(move || async move { health::readiness_check(state).await }),
        )
}
