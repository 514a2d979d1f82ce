//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use quotebook_domain::error::{NotFoundError, QuotebookError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`QuotebookError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(QuotebookError);

impl From<QuotebookError> for ApiError {
    fn from(err: QuotebookError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl From<NotFoundError> for ApiError {
    fn from(err: NotFoundError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            QuotebookError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            QuotebookError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            QuotebookError::Storage(err) => {
                tracing::error!(error = ?err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
