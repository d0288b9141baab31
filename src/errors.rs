// src/errors.rs

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    CacheError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("Validation errors")]
    ValidationError(#[from] ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Missing token: {0}")]
    MissingToken(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Unauthorized access: {0}")]
    UnauthorizedAccess(String),

    #[error("Upstream service error: {0}")]
    UpstreamError(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn product_not_found() -> Self {
        AppError::NotFound("Product Not Found".to_string())
    }

    pub fn order_not_found() -> Self {
        AppError::NotFound("Order Not Found".to_string())
    }

    pub fn review_not_found() -> Self {
        AppError::NotFound("Review Not Found".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::SqlxError(sqlx_error) => {
                tracing::error!("Database error: {:?}", sqlx_error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::CacheError(redis_error) => {
                tracing::error!("Cache store error: {:?}", redis_error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::SerializationError(serde_error) => {
                tracing::error!("Serialization error: {:?}", serde_error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::ValidationError(errors) => {
                let mut messages = Vec::new();
                for (field, field_errors) in errors.field_errors() {
                    for error in field_errors {
                        let msg = error.message.as_ref().map_or_else(
                            || format!("Field '{}' is invalid", field),
                            |m| m.to_string(),
                        );
                        messages.push(msg);
                    }
                }
                messages.sort();
                (StatusCode::BAD_REQUEST, messages.join("; "))
            }
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::MissingToken(message) => (StatusCode::UNAUTHORIZED, message),
            AppError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired".to_string()),
            AppError::InvalidToken(message) => (StatusCode::UNAUTHORIZED, message),
            AppError::UnauthorizedAccess(message) => (StatusCode::FORBIDDEN, message),
            AppError::UpstreamError(message) => {
                tracing::error!("Upstream service error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            AppError::InternalServerError(message) => {
                tracing::error!("Internal server error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({ "success": false, "message": message }));
        (status, body).into_response()
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken("Token is invalid or malformed".to_string()),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        tracing::error!("Multipart processing error: {:?}", err);
        AppError::BadRequest(format!("Could not read form data: {}", err))
    }
}
