//! Error responses for the HTTP layer.
//!
//! Handlers return `Result<_, HttpAppError>`. Store, storage, image validation, and form
//! validation failures all convert into it with `?`, so every failure is logged once and
//! rendered as the same `ErrorResponse` body.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use farmstand_core::validation::ValidationError;
use farmstand_core::{AppError, ErrorMetadata, LogLevel};
use farmstand_storage::StorageError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of every non-2xx response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
    /// Error chain, only outside production
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Stable code such as `NOT_FOUND`
    pub code: String,
    /// Retrying the same request may succeed
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// `AppError` as an axum response.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<validator::ValidationErrors> for HttpAppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self(errors.into())
    }
}

impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        let reason = rejection.body_text();
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self(AppError::PayloadTooLarge(format!(
                "Request body too large: {}",
                reason
            )));
        }
        let message = if reason.contains("unknown field") {
            format!(
                "Invalid request body: {}. Updatable fields are name, price, description, tags, imageUrls, imageHint, status, createdAt",
                reason
            )
        } else {
            format!("Invalid request body: {}", reason)
        };
        Self(AppError::InvalidInput(message))
    }
}

/// `Json<T>` whose rejections render as `ErrorResponse` with status 400.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection.into()),
        }
    }
}

impl From<QueryRejection> for HttpAppError {
    fn from(rejection: QueryRejection) -> Self {
        Self(AppError::InvalidInput(format!(
            "Invalid query string: {}",
            rejection.body_text()
        )))
    }
}

/// `Query<T>` whose rejections render as `ErrorResponse` with status 400.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

fn log_error(error: &AppError, status: StatusCode) {
    let code = error.error_code();
    let status = status.as_u16();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, code, status, "Request rejected");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, code, status, "Request rejected");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, code, status, "Request failed");
        }
    }
}

/// Same rule as `Config::is_production`, read from the environment since responses
/// are rendered without access to state.
fn is_production_env() -> bool {
    let environment = std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_default()
        .to_lowercase();
    matches!(environment.as_str(), "production" | "prod")
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let Self(error) = self;
        let status = StatusCode::from_u16(error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        log_error(&error, status);

        let expose = !error.is_sensitive() && !is_production_env();
        let body = ErrorResponse {
            error: error.client_message(),
            details: expose.then(|| error.detailed_message()),
            error_type: expose.then(|| error.error_type().to_string()),
            code: error.error_code().to_string(),
            recoverable: error.is_recoverable(),
            suggested_action: error.suggested_action().map(str::to_string),
        };

        (status, Json(body)).into_response()
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        Self(match err {
            StorageError::InvalidKey(key) => AppError::InvalidInput(key),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
            StorageError::UploadFailed(msg)
            | StorageError::DeleteFailed(msg)
            | StorageError::Unavailable(msg) => AppError::Storage(msg),
        })
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        let message = match err {
            ValidationError::FileTooLarge { size, max } => {
                return Self(AppError::PayloadTooLarge(format!(
                    "Image of {} bytes exceeds max {} bytes",
                    size, max
                )))
            }
            ValidationError::InvalidExtension { extension, allowed } => format!(
                "Invalid image extension '{}', allowed: {}",
                extension,
                allowed.join(", ")
            ),
            ValidationError::InvalidContentType {
                content_type,
                allowed,
            } => format!(
                "Invalid image content type '{}', allowed: {}",
                content_type,
                allowed.join(", ")
            ),
            ValidationError::MissingExtension(filename) => {
                format!("Missing image file extension (filename: {})", filename)
            }
            ValidationError::EmptyFile => "Image file is empty".to_string(),
        };
        Self(AppError::InvalidInput(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_storage_error_config_is_internal() {
        let storage_err = StorageError::ConfigError("upload dir".to_string());
        let HttpAppError(app_err) = storage_err.into();
        assert!(matches!(app_err, AppError::Internal(_)));
    }

    #[test]
    fn test_from_storage_error_upload_failed() {
        let storage_err = StorageError::UploadFailed("disk full".to_string());
        let HttpAppError(app_err) = storage_err.into();
        match app_err {
            AppError::Storage(msg) => assert_eq!(msg, "disk full"),
            _ => panic!("Expected Storage variant"),
        }
    }

    #[test]
    fn test_from_storage_error_invalid_key() {
        let storage_err = StorageError::InvalidKey("../x".to_string());
        let HttpAppError(app_err) = storage_err.into();
        assert!(matches!(app_err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_from_validation_error_file_too_large() {
        let validation_err = ValidationError::FileTooLarge {
            size: 6_000_000,
            max: 5_000_000,
        };
        let HttpAppError(app_err) = validation_err.into();
        match app_err {
            AppError::PayloadTooLarge(msg) => {
                assert!(msg.contains("6000000"));
                assert!(msg.contains("5000000"));
            }
            _ => panic!("Expected PayloadTooLarge variant"),
        }
    }

    #[test]
    fn test_from_validation_error_invalid_extension() {
        let validation_err = ValidationError::InvalidExtension {
            extension: "gif".to_string(),
            allowed: vec!["jpg".to_string(), "png".to_string()],
        };
        let HttpAppError(app_err) = validation_err.into();
        match app_err {
            AppError::InvalidInput(msg) => {
                assert!(msg.contains("gif"));
                assert!(msg.contains("jpg, png"));
            }
            _ => panic!("Expected InvalidInput variant"),
        }
    }

    #[test]
    fn test_from_validation_error_empty_file() {
        let HttpAppError(app_err) = ValidationError::EmptyFile.into();
        match app_err {
            AppError::InvalidInput(msg) => assert_eq!(msg, "Image file is empty"),
            _ => panic!("Expected InvalidInput variant"),
        }
    }

    #[test]
    fn test_store_error_renders_500_with_message() {
        let response =
            HttpAppError(AppError::Store("failed to parse products.json".to_string()))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_renders_404() {
        let response =
            HttpAppError(AppError::NotFound("Product not found".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    /// The public error contract: "error", "code", "recoverable", and optional extras.
    #[test]
    fn test_error_response_shape() {
        let response = ErrorResponse {
            error: "Product not found".to_string(),
            details: None,
            error_type: Some("NotFound".to_string()),
            code: "NOT_FOUND".to_string(),
            recoverable: false,
            suggested_action: None,
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["recoverable"], false);
        assert!(json.get("details").is_none());
    }
}
