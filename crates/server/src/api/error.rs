//! Error mapping from engine rejections to HTTP responses.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::Serialize;

use clinicflow_core::{ErrorKind, QueueError};

/// Error response body shared by all API handlers.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Wrapper turning a `QueueError` into an HTTP response.
///
/// NotFound -> 404, IllegalTransition -> 409, PreconditionFailed -> 422.
#[derive(Debug)]
pub struct ApiError(pub QueueError);

impl From<QueueError> for ApiError {
    fn from(e: QueueError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::IllegalTransition => StatusCode::CONFLICT,
            ErrorKind::PreconditionFailed => StatusCode::UNPROCESSABLE_ENTITY,
        };
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
