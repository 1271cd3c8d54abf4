//! Error types module
//!
//! All errors surfaced by the service are unified under the `AppError` enum, which can
//! represent store, storage, validation, and lookup failures. Each variant describes its own
//! HTTP presentation through `ErrorMetadata`.

use std::io;

/// Level an error is logged at when it reaches the HTTP layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Warn,
    Error,
}

/// HTTP presentation of an error: status, machine code, retry hint, and what the
/// client may see.
pub trait ErrorMetadata {
    fn http_status_code(&self) -> u16;

    /// Stable code such as `STORE_ERROR`
    fn error_code(&self) -> &'static str;

    /// Retrying the same request may succeed
    fn is_recoverable(&self) -> bool;

    fn suggested_action(&self) -> Option<&'static str>;

    /// Message placed in the response body
    fn client_message(&self) -> String;

    /// Details must never reach the client
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Product store error: {0}")]
    Store(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// Malformed or missing field, rejected by validation
    #[error("Invalid product input: {0}")]
    InvalidInput(String),

    /// Request understood but not acceptable, such as an unknown approval status
    #[error("Rejected request: {0}")]
    BadRequest(String),

    #[error("Missing resource: {0}")]
    NotFound(String),

    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unexpected failure: {0}")]
    Internal(String),

    #[error("Unexpected failure: {message}")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("filesystem: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Product validation failed: {}", err))
    }
}

/// How one kind of failure is presented to clients and operators.
#[derive(Debug, Clone, Copy)]
struct ErrorClass {
    status: u16,
    code: &'static str,
    kind: &'static str,
    recoverable: bool,
    hint: Option<&'static str>,
    sensitive: bool,
    level: LogLevel,
}

const RETRY_HINT: Option<&str> = Some("Retry after a short delay");

const STORE: ErrorClass = ErrorClass {
    status: 500,
    code: "STORE_ERROR",
    kind: "Store",
    recoverable: true,
    hint: RETRY_HINT,
    sensitive: false,
    level: LogLevel::Error,
};

const STORAGE: ErrorClass = ErrorClass {
    code: "STORAGE_ERROR",
    kind: "Storage",
    ..STORE
};

const INTERNAL: ErrorClass = ErrorClass {
    code: "INTERNAL_ERROR",
    kind: "Internal",
    sensitive: true,
    ..STORE
};

const INVALID_INPUT: ErrorClass = ErrorClass {
    status: 400,
    code: "INVALID_INPUT",
    kind: "InvalidInput",
    recoverable: false,
    hint: Some("Check request parameters and try again"),
    sensitive: false,
    level: LogLevel::Debug,
};

const BAD_REQUEST: ErrorClass = ErrorClass {
    code: "BAD_REQUEST",
    kind: "BadRequest",
    hint: Some("Check request format and parameters"),
    ..INVALID_INPUT
};

const NOT_FOUND: ErrorClass = ErrorClass {
    status: 404,
    code: "NOT_FOUND",
    kind: "NotFound",
    hint: Some("Verify the product ID exists"),
    ..INVALID_INPUT
};

// Oversized uploads are worth noticing in logs
const PAYLOAD_TOO_LARGE: ErrorClass = ErrorClass {
    status: 413,
    code: "PAYLOAD_TOO_LARGE",
    kind: "PayloadTooLarge",
    hint: Some("Reduce image size and try again"),
    level: LogLevel::Warn,
    ..INVALID_INPUT
};

impl AppError {
    fn class(&self) -> ErrorClass {
        match self {
            AppError::Store(_) => STORE,
            AppError::Storage(_) => STORAGE,
            AppError::InvalidInput(_) => INVALID_INPUT,
            AppError::BadRequest(_) => BAD_REQUEST,
            AppError::NotFound(_) => NOT_FOUND,
            AppError::PayloadTooLarge(_) => PAYLOAD_TOO_LARGE,
            AppError::Internal(_) | AppError::InternalWithSource { .. } => INTERNAL,
        }
    }

    /// Variant name shown in non-production error bodies
    pub fn error_type(&self) -> &'static str {
        self.class().kind
    }

    /// Display text followed by up to five `Caused by:` lines from the source chain.
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        const MAX_CAUSES: usize = 5;
        let mut details = self.to_string();
        let causes: Vec<String> = std::iter::successors(self.source(), |err| (*err).source())
            .map(|err| err.to_string())
            .take(MAX_CAUSES + 1)
            .collect();

        for (i, cause) in causes.iter().enumerate() {
            if i == MAX_CAUSES {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str("\n  Caused by: ");
            details.push_str(cause);
        }
        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        self.class().status
    }

    fn error_code(&self) -> &'static str {
        self.class().code
    }

    fn is_recoverable(&self) -> bool {
        self.class().recoverable
    }

    fn suggested_action(&self) -> Option<&'static str> {
        self.class().hint
    }

    fn is_sensitive(&self) -> bool {
        self.class().sensitive
    }

    fn log_level(&self) -> LogLevel {
        self.class().level
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Store(msg) => format!("Failed to access product store: {}", msg),
            AppError::Storage(msg) => format!("Failed to access image storage: {}", msg),
            AppError::InvalidInput(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}
