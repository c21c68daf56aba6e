//! HTTP Error Mapping
//!
//! Maps application errors to status codes and a `{"error": message}` body.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dontq_core::domain::DomainError;
use dontq_core::error::AppError;
use serde_json::json;
use tracing::error;

/// Error returned by every handler
#[derive(Debug)]
pub enum ApiError {
    App(AppError),
    BadRequest(String),
    RateLimited,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::App(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::App(err) => status_for(err),
        }
    }
}

/// Status code for an application error
pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::Validation(_) => StatusCode::BAD_REQUEST,
        AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Conflict(_) | AppError::InvalidState(_) => StatusCode::CONFLICT,
        AppError::Domain(e) => match e {
            DomainError::QueueFull { .. }
            | DomainError::InvalidShortId(_)
            | DomainError::ValidationError(_) => StatusCode::BAD_REQUEST,
            DomainError::QueueInactive(_) => StatusCode::CONFLICT,
            DomainError::InvalidStateTransition { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        },
        AppError::Database(_)
        | AppError::Serialization(_)
        | AppError::Config(_)
        | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::RateLimited => "Rate limit exceeded. Please slow down.".to_string(),
            ApiError::App(AppError::Domain(DomainError::QueueFull { .. })) => {
                "Queue is full".to_string()
            }
            ApiError::App(err) if status.is_server_error() => {
                // Store details stay in the log
                error!(error = %err, "Request failed");
                "An unexpected error occurred".to_string()
            }
            ApiError::App(err) => err.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
