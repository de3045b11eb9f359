//! MathViz — API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mathviz_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The course root could not be loaded.
    #[error("course catalog error: {0}")]
    Catalog(#[from] DomainError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::MalformedScript { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "malformed_script")
            }
            DomainError::SessionNotLoaded => (StatusCode::CONFLICT, "session_not_loaded"),
            DomainError::PositionOutOfRange { .. } => {
                (StatusCode::BAD_REQUEST, "position_out_of_range")
            }
            DomainError::InvalidCourseId(_) => (StatusCode::BAD_REQUEST, "invalid_course_id"),
            DomainError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "session_not_found"),
            DomainError::CourseNotFound(_) => (StatusCode::NOT_FOUND, "course_not_found"),
            DomainError::RegistrationDefect { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "registration_defect")
            }
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
