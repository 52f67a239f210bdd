//! # Error Module
//!
//! Application-wide error type. Every failure a handler can surface is a
//! variant here, and `IntoResponse` turns it into a JSON body of the form
//! `{"error": "...", "code": "..."}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

/// Errors produced by services and handlers
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Movie not found with id = {0}")]
    MovieNotFound(i32),

    #[error("File already exist! Please enter another file name! ({0})")]
    FileAlreadyExists(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("File is empty! Please send another file!")]
    EmptyFile,

    #[error("{0}")]
    Validation(String),

    #[error("Invalid page request: {0}")]
    InvalidPageRequest(String),

    #[error("Cannot sort by unknown field '{0}'")]
    InvalidSortField(String),

    #[error("Please provide an valid email! ({0})")]
    UserNotFound(String),

    #[error("Email {0} is already registered")]
    EmailAlreadyRegistered(String),

    #[error("Username {0} is already taken")]
    UsernameAlreadyTaken(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(String),

    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error("Invalid OTP for the given email")]
    InvalidOtp,

    #[error("OTP has expired!")]
    OtpExpired,

    #[error("Please enter the password again!")]
    PasswordMismatch,

    #[error("Refresh token not found")]
    RefreshTokenNotFound,

    #[error("Refresh Token expired")]
    RefreshTokenExpired,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Result alias used by services and handlers
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// HTTP status and machine-readable code for this error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::MovieNotFound(_) => (StatusCode::NOT_FOUND, "MOVIE_NOT_FOUND"),
            AppError::FileAlreadyExists(_) => (StatusCode::BAD_REQUEST, "FILE_ALREADY_EXISTS"),
            AppError::FileNotFound(_) => (StatusCode::NOT_FOUND, "FILE_NOT_FOUND"),
            AppError::EmptyFile => (StatusCode::BAD_REQUEST, "EMPTY_FILE"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::InvalidPageRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_PAGE_REQUEST"),
            AppError::InvalidSortField(_) => (StatusCode::BAD_REQUEST, "INVALID_SORT_FIELD"),
            AppError::UserNotFound(_) => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
            AppError::EmailAlreadyRegistered(_) => (StatusCode::CONFLICT, "EMAIL_ALREADY_REGISTERED"),
            AppError::UsernameAlreadyTaken(_) => (StatusCode::CONFLICT, "USERNAME_ALREADY_TAKEN"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::InvalidOtp => (StatusCode::BAD_REQUEST, "INVALID_OTP"),
            AppError::OtpExpired => (StatusCode::EXPECTATION_FAILED, "OTP_EXPIRED"),
            AppError::PasswordMismatch => (StatusCode::EXPECTATION_FAILED, "PASSWORD_MISMATCH"),
            AppError::RefreshTokenNotFound => (StatusCode::UNAUTHORIZED, "REFRESH_TOKEN_NOT_FOUND"),
            AppError::RefreshTokenExpired => (StatusCode::UNAUTHORIZED, "REFRESH_TOKEN_EXPIRED"),
            AppError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Server-side failures are logged in full but reported generically
        let message = match &self {
            AppError::Io(e) => {
                tracing::error!(error = %e, "File store I/O failure");
                "An internal error occurred".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!(error = ?e, "Internal error");
                "An internal error occurred".to_string()
            }
            other => {
                tracing::warn!(code, "{}", other);
                other.to_string()
            }
        };

        (status, Json(json!({ "error": message, "code": code }))).into_response()
    }
}
