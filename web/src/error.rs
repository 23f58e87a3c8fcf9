//! Error types for web handlers.
//!
//! [`AppError`] carries everything needed to render an error response and
//! implements Axum's `IntoResponse`. The body is always JSON:
//!
//! ```json
//! { "code": "VALIDATION_ERROR", "message": "...", "errors": [{ "message": "...", "field": "..." }] }
//! ```
//!
//! `errors` is only present for validation failures.

use actions_core::ValidationFinding;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler(Path(id): Path<String>) -> Result<Json<Action>, AppError> {
///     let id: ActionId = id
///         .parse()
///         .map_err(|_| AppError::bad_request(format!("Unable to parse actionId: {id}")))?;
///     // ...
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Field-level findings, for validation failures
    errors: Option<Vec<ValidationFinding>>,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            errors: None,
            source: None,
        }
    }

    /// Attach the underlying error for logging.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "BAD_REQUEST".to_string(),
        )
    }

    /// Create a 403 Forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            message.into(),
            "FORBIDDEN".to_string(),
        )
    }

    /// Create a 422 error for a body that could not be read as JSON.
    #[must_use]
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            message.into(),
            "UNPROCESSABLE_ENTITY".to_string(),
        )
    }

    /// Create a 422 error carrying validation findings.
    #[must_use]
    pub fn validation(findings: Vec<ValidationFinding>) -> Self {
        let mut error = Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Validation failed".to_string(),
            "VALIDATION_ERROR".to_string(),
        );
        error.errors = Some(findings);
        error
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }

    /// HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
    /// Field-level findings.
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<ValidationFinding>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = %self.status,
                code = %self.code,
                message = %self.message,
                error = ?self.source,
                "Internal server error"
            );
        } else if let Some(source) = &self.source {
            tracing::warn!(
                status = %self.status,
                code = %self.code,
                message = %self.message,
                error = %source,
                "Request failed"
            );
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
            errors: self.errors,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{Value, json};

    async fn body_json(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[tokio::test]
    async fn test_bad_request_body_has_no_errors_field() {
        let (status, body) = body_json(AppError::bad_request("Missing header")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "code": "BAD_REQUEST", "message": "Missing header" }));
    }

    #[tokio::test]
    async fn test_validation_body_lists_findings() {
        let findings = actions_core::validation::validate_at(
            &actions_core::Action::default(),
            true,
            chrono_now(),
        );
        let count = findings.len();

        let (status, body) = body_json(AppError::validation(findings)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["errors"].as_array().unwrap().len(), count);
        assert_eq!(body["errors"][0]["field"], "ActionSummary");
    }

    #[test]
    fn test_forbidden_status() {
        assert_eq!(AppError::forbidden("read only").status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_anyhow_maps_to_internal() {
        let err: AppError = anyhow::anyhow!("boom").into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(std::error::Error::source(&err).is_some());
    }

    fn chrono_now() -> actions_core::DateTime<actions_core::Utc> {
        actions_core::Utc::now()
    }
}
