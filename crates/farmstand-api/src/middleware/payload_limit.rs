use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use farmstand_core::AppError;

use crate::error::HttpAppError;

/// Re-render a plain-text 413 from the body limit layer as an `ErrorResponse`.
///
/// Handler-produced 413s already carry a JSON body and pass through untouched.
pub async fn payload_limit_response(response: Response) -> Response {
    if response.status() != StatusCode::PAYLOAD_TOO_LARGE {
        return response;
    }
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if is_json {
        return response;
    }

    HttpAppError(AppError::PayloadTooLarge(
        "Request body exceeds the configured limit".to_string(),
    ))
    .into_response()
}
