//! Custom error types for the API service
//!
//! One tagged enum covers the whole failure taxonomy and is matched
//! explicitly at the response boundary. Every response body carries
//! `{status, message}`; validation failures carry the field-keyed reason
//! map as the message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Validation failure: field name to reason
    #[error("Unprocessable request")]
    Unprocessable(HashMap<String, String>),

    /// Referenced resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Missing, invalid, or expired credentials, or an ownership mismatch
    #[error("{0}")]
    Unauthorized(String),

    /// Resource already exists
    #[error("{0}")]
    Conflict(String),

    /// Request is well-formed but cannot be honored
    #[error("{0}")]
    BadRequest(String),

    /// Unexpected failure; the message is fixed by the failing handler and
    /// internal detail stays in the log
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unprocessable(errors) => {
                (StatusCode::UNPROCESSABLE_ENTITY, json!(errors))
            }
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, json!(message)),
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, json!(message)),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, json!(message)),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!(message)),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, json!(message)),
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
