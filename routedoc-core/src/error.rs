use crate::http::{IntoResponse, Json, Response, StatusCode};
use crate::validation::FacetFailure;

/// Error type returned by route handlers.
///
/// Converted to an HTTP response by the engine: recoverable variants map to
/// their status code with a JSON `{ "error": ... }` body, `Validation`
/// reproduces the middleware's 400 wire format, and `Internal` answers with
/// an opaque 500 — stack traces never reach the wire.
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
    Validation(Vec<FacetFailure>),
    Custom {
        status: StatusCode,
        body: serde_json::Value,
    },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(failures) => {
                (StatusCode::BAD_REQUEST, Json(failures)).into_response()
            }
            AppError::Custom { status, body } => (status, Json(body)).into_response(),
            AppError::NotFound(msg) => error_response(StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => error_response(StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error in handler");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    let body = serde_json::json!({ "error": message });
    (status, Json(body)).into_response()
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
            AppError::Validation(failures) => {
                write!(f, "Validation Error: {} failed facet(s)", failures.len())
            }
            AppError::Custom { status, body } => write!(f, "Custom Error ({status}): {body}"),
        }
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Display>::fmt(self, f)
    }
}
