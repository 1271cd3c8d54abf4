//! Health check handlers and response types.

use crate::state::AppState;
use axum::{http::StatusCode, response::IntoResponse, Json};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Run an async check with timeout; returns "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(serde::Serialize)]
pub(super) struct HealthCheckResponse {
    pub status: String,
    pub store: String,
    pub storage: String,
}

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness probe - the product file can be read and parsed.
pub async fn readiness_check(state: Arc<AppState>) -> impl IntoResponse {
    let repository = state.products.repository.clone();
    let store = run_check(
        TIMEOUT,
        async move { repository.list().await.map(drop) },
        "not_ready",
    )
    .await;

    if store == "healthy" {
        (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ready", "store": "ready" })),
        )
    } else {
        tracing::error!(store = %store, "Readiness check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "not_ready", "store": store })),
        )
    }
}

/// Full health check. The store must parse and the upload directory must accept writes.
pub async fn health_check(state: Arc<AppState>) -> impl IntoResponse {
    let repository = state.products.repository.clone();
    let store = run_check(
        TIMEOUT,
        async move { repository.list().await.map(drop) },
        "unhealthy",
    )
    .await;

    let storage = state.products.storage.clone();
    let storage_status = run_check(
        TIMEOUT,
        async move { storage.check_writable().await },
        "degraded",
    )
    .await;

    let healthy = store == "healthy";
    let response = HealthCheckResponse {
        status: if !healthy {
            "unhealthy".to_string()
        } else if storage_status != "healthy" {
            "degraded".to_string()
        } else {
            "healthy".to_string()
        },
        store,
        storage: storage_status,
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
