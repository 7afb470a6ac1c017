// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Global Application Error Enum.
/// Covers the academy error taxonomy and its mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 401: no directory record for the access code
    InvalidCode,

    // 403: record exists but its login capability is disabled
    AccessRevoked,

    // 402: attendance write blocked by an unpaid month
    PaymentRequired { month: String },

    // 502: generated quiz rejected after all retries
    ExternalContentInvalid(String),

    // 502: remote certificate registration failed
    RemoteWriteFailed(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized (no current session)
    AuthError(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidCode => (
                StatusCode::UNAUTHORIZED,
                "Access denied. Invalid code.".to_string(),
            ),
            AppError::AccessRevoked => (
                StatusCode::FORBIDDEN,
                "Access revoked. Contact the administration.".to_string(),
            ),
            AppError::PaymentRequired { month } => (
                StatusCode::PAYMENT_REQUIRED,
                format!("Payment for {} not found. Attendance locked.", month),
            ),
            AppError::ExternalContentInvalid(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::RemoteWriteFailed(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on store queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}
