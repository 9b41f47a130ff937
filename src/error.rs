// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::{
    clients::ServiceError,
    exam::{session::SessionError, submission::SubmitError},
};

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

    // 404 Not Found (e.g., exam not started yet)
    NotFound(String),

    // 409 Conflict (already submitted, time over)
    Conflict(String),

    // 502 Bad Gateway: the exam service could not be reached or answered garbage.
    // The candidate may retry the action.
    ServiceUnavailable(String),
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
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Exam service failure: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "The exam service is not responding. Please try again.".to_string(),
                )
            }
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Remote failures become user-facing messages; none of them are fatal.
impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Auth => AppError::AuthError("Invalid credentials".to_string()),
            ServiceError::Transport(msg) => AppError::ServiceUnavailable(msg),
            ServiceError::Rejected(status) => {
                AppError::ServiceUnavailable(format!("unexpected status '{}'", status))
            }
        }
    }
}

/// State machine errors. Bank and index problems mean a caller bug or a broken
/// bank and are reported as 500; lock errors are what a candidate sees after
/// the exam is over.
impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        let message = err.to_string();
        match err {
            SessionError::AlreadySubmitted => {
                AppError::Conflict("Exam has already been submitted".to_string())
            }
            SessionError::Expired => AppError::Conflict(
                "Exam time is over. Submit the exam to finish.".to_string(),
            ),
            SessionError::UnknownQuestion(id) => {
                AppError::NotFound(format!("Question '{}' not found", id))
            }
            SessionError::InvalidOption(_) => AppError::BadRequest(message),
            SessionError::EmptyBank
            | SessionError::InvalidBank(_)
            | SessionError::OutOfRange { .. }
            | SessionError::InvalidDuration(_) => AppError::InternalServerError(message),
        }
    }
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Session(e) => e.into(),
            SubmitError::Service(e) => e.into(),
        }
    }
}
