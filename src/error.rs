//! Error types for the Floating Library server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Machine-readable error codes surfaced in API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Failure,
    NotAuthenticated,
    NotAuthorized,
    NoSuchEntity,
    BadValue,
    Duplicate,
    DbFailure,
    SelfBorrow,
    BorrowLimitReached,
    BookUnavailable,
    DuplicateRequest,
    InvalidState,
    OtpExpired,
    OtpInvalid,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("You cannot request your own book")]
    SelfBorrow,

    #[error("You have reached the maximum number of borrowed books ({0})")]
    BorrowLimitReached(u32),

    #[error("This book is currently unavailable")]
    BookUnavailable,

    #[error("You have already requested this book")]
    DuplicateRequest,

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("OTP expired")]
    OtpExpired,

    #[error("Invalid OTP")]
    OtpInvalid,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl AppError {
    fn code(&self) -> ErrorCode {
        match self {
            AppError::Authentication(_) => ErrorCode::NotAuthenticated,
            AppError::Authorization(_) => ErrorCode::NotAuthorized,
            AppError::NotFound(_) => ErrorCode::NoSuchEntity,
            AppError::Validation(_) => ErrorCode::BadValue,
            AppError::Conflict(_) => ErrorCode::Duplicate,
            AppError::SelfBorrow => ErrorCode::SelfBorrow,
            AppError::BorrowLimitReached(_) => ErrorCode::BorrowLimitReached,
            AppError::BookUnavailable => ErrorCode::BookUnavailable,
            AppError::DuplicateRequest => ErrorCode::DuplicateRequest,
            AppError::InvalidState(_) => ErrorCode::InvalidState,
            AppError::OtpExpired => ErrorCode::OtpExpired,
            AppError::OtpInvalid => ErrorCode::OtpInvalid,
            AppError::Database(_) => ErrorCode::DbFailure,
            AppError::Internal(_) => ErrorCode::Failure,
        }
    }

    /// HTTP status the error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_)
            | AppError::SelfBorrow
            | AppError::BorrowLimitReached(_)
            | AppError::BookUnavailable
            | AppError::DuplicateRequest
            | AppError::InvalidState(_)
            | AppError::OtpExpired
            | AppError::OtpInvalid => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borrow_conflicts_are_bad_requests() {
        assert_eq!(AppError::SelfBorrow.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::BorrowLimitReached(2).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::BookUnavailable.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::DuplicateRequest.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn wrong_actor_is_forbidden() {
        let err = AppError::Authorization("not the owner".into());
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn otp_failures_map_to_bad_request() {
        assert_eq!(AppError::OtpExpired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::OtpInvalid.status(), StatusCode::BAD_REQUEST);
    }
}
