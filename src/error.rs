use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use crate::schemas::ErrorResponse;

/// Error taxonomy for the whole HTTP surface. Every handler returns
/// `Result<_, ApiError>` and the mapping to status codes lives in one
/// place.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad, missing or expired credentials.
    #[error("{0}")]
    Authentication(String),

    /// Authenticated but not allowed (non-admin on an admin route).
    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    NotFound(String),

    /// Rejected request payload (e.g. duplicate username).
    #[error("{0}")]
    Validation(String),

    /// The upstream weather API failed: transport error, non-200 status
    /// or a body that was not JSON.
    #[error("{0}")]
    Upstream(String),

    /// The server is missing required configuration.
    #[error("{0}")]
    Configuration(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Authentication(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::Authorization(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            ApiError::Upstream(msg) => {
                warn!("Upstream weather API failure: {}", msg);
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg)
            }
            ApiError::Configuration(msg) => {
                error!("Configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR", msg)
            }
            ApiError::Database(e) => {
                error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Internal server error".to_string(),
                )
            }
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            code: code.to_string(),
            success: false,
        });

        (status, body).into_response()
    }
}
