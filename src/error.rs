// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::scoring::validator::ValidationErrors;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    AuthError(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., session already submitted)
    Conflict(String),

    // 410 Gone (expired test link)
    Gone(String),

    // 422 Unprocessable Entity, one entry per offending field
    Unprocessable(ValidationErrors),
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
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Gone(msg) => (StatusCode::GONE, msg),
            AppError::Unprocessable(errors) => {
                let body = Json(json!({
                    "error": "Validation failed",
                    "errors": errors,
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

/// Why a test submission was refused.
#[derive(Debug)]
pub enum SubmissionError {
    SessionNotFound,
    SessionAlreadyCompleted,
    SessionExpired,
    Validation(ValidationErrors),
    /// The catalog holds data the scorer cannot interpret.
    Catalog(String),
    Storage(sqlx::Error),
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionError::SessionNotFound => write!(f, "test session not found"),
            SubmissionError::SessionAlreadyCompleted => {
                write!(f, "test session has already been submitted")
            }
            SubmissionError::SessionExpired => write!(f, "test session has expired"),
            SubmissionError::Validation(errors) => write!(f, "invalid answers: {}", errors),
            SubmissionError::Catalog(msg) => write!(f, "catalog error: {}", msg),
            SubmissionError::Storage(err) => write!(f, "storage error: {}", err),
        }
    }
}

impl std::error::Error for SubmissionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubmissionError::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for SubmissionError {
    fn from(err: sqlx::Error) -> Self {
        SubmissionError::Storage(err)
    }
}

impl From<SubmissionError> for AppError {
    fn from(err: SubmissionError) -> Self {
        let message = err.to_string();
        match err {
            SubmissionError::SessionNotFound => AppError::NotFound(message),
            SubmissionError::SessionAlreadyCompleted => AppError::Conflict(message),
            SubmissionError::SessionExpired => AppError::Gone(message),
            SubmissionError::Validation(errors) => AppError::Unprocessable(errors),
            SubmissionError::Catalog(_) | SubmissionError::Storage(_) => {
                AppError::InternalServerError(message)
            }
        }
    }
}
