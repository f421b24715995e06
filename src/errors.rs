use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::store::StoreError;

/// Application-specific error types.
#[derive(Debug)]
pub enum AppError {
    /// Bad request error (invalid input).
    BadRequest(String),
    /// Resource not found error.
    NotFound(String),
    /// Request body could not be read within the size limit.
    PayloadTooLarge(String),
    /// The record store failed. `message` is what the caller sees; `source` is only logged.
    Store {
        message: String,
        source: StoreError,
    },
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            AppError::Store { message, source } => write!(f, "{}: {}", message, source),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Store { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    /// Maps each variant to a status code and a `{"error": ...}` body.
    ///
    /// Store failures are logged in full; the caller only gets the public message.
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            AppError::BadRequest(msg) => {
                tracing::debug!("Rejected request: {}", msg);
                msg
            }
            AppError::NotFound(msg) | AppError::PayloadTooLarge(msg) => msg,
            AppError::Store { message, source } => {
                tracing::error!("{} ({})", message, source);
                message
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Attaches the caller-facing message to a store failure.
pub trait ResultExt<T> {
    fn or_fail(self, message: impl Into<String>) -> Result<T, AppError>;
}

impl<T> ResultExt<T> for Result<T, StoreError> {
    fn or_fail(self, message: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|source| AppError::Store {
            message: message.into(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_store_error_hides_detail() {
        let result: Result<(), StoreError> = Err(StoreError::Backend {
            status: 403,
            message: "PERMISSION_DENIED on projects/secret-project".to_string(),
        });
        let err = result.or_fail("Failed to fetch properties.").unwrap_err();

        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to fetch properties." }));
    }

    #[tokio::test]
    async fn test_client_errors_keep_message() {
        let (status, body) = body_json(AppError::NotFound("Property not found.".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Property not found.");

        let (status, _) = body_json(AppError::BadRequest("nope".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) =
            body_json(AppError::PayloadTooLarge("Request body too large.".into())).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"], "Request body too large.");
    }
}
