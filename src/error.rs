use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Application error taxonomy. Each variant maps to a distinct response
/// category so clients can react to a `Conflict` (pick other dates)
/// differently from an `InvalidRange` (fix the form).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidRange(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    WrongListingType(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    MisconfiguredListing(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::InvalidRange(_) => "INVALID_RANGE",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::WrongListingType(_) => "WRONG_LISTING_TYPE",
            AppError::Unavailable(_) => "UNAVAILABLE",
            AppError::MisconfiguredListing(_) => "MISCONFIGURED_LISTING",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Internal(_) | AppError::Database(_) => "INTERNAL",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRange(_)
            | AppError::WrongListingType(_)
            | AppError::Unavailable(_)
            | AppError::MisconfiguredListing(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Storage and internal failures are logged server-side and surfaced
        // without internal detail.
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "database error");
                "Internal server error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "code": self.code(),
            "message": message,
        }));

        (self.status(), body).into_response()
    }
}
