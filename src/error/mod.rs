//! Application error types and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::auth::TokenError;
use crate::middleware::AuthRejection;
use crate::services::CredentialError;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request body: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Unauthorized(#[from] AuthRejection),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error body: a stable machine-readable code plus a human message.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

impl AppError {
    /// Status, stable code and caller-facing message.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request_body", msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_failed", msg.clone())
            }
            AppError::Credentials(e) => {
                let (status, code) = match e {
                    CredentialError::Validation(_) => {
                        (StatusCode::BAD_REQUEST, "validation_failed")
                    }
                    CredentialError::InvalidBirthdayFormat => {
                        (StatusCode::BAD_REQUEST, "invalid_birthday_format")
                    }
                    CredentialError::DuplicateEmail => (StatusCode::CONFLICT, "duplicate_email"),
                    CredentialError::InvalidCredentials => {
                        (StatusCode::UNAUTHORIZED, "invalid_credentials")
                    }
                    CredentialError::NotFound => (StatusCode::NOT_FOUND, "user_not_found"),
                    CredentialError::HashFailure => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "hash_failure")
                    }
                    CredentialError::PersistenceFailure => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "persistence_failure")
                    }
                };
                (status, code, e.to_string())
            }
            AppError::Token(TokenError::Generation(_) | TokenError::EmptySecret) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "token_generation_failed",
                "Token generation failed".to_string(),
            ),
            AppError::Token(_) => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid token".to_string(),
            ),
            AppError::Unauthorized(rejection) => {
                let code = match rejection {
                    AuthRejection::MissingHeader => "missing_authorization_header",
                    AuthRejection::MissingBearerPrefix => "missing_bearer_prefix",
                    AuthRejection::EmptyToken => "missing_token",
                    AuthRejection::Token(_) => "invalid_token",
                };
                (StatusCode::UNAUTHORIZED, code, rejection.to_string())
            }
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            error!(error = %self, code, "request failed");
        }
        (status, Json(ErrorResponse { error: code, message })).into_response()
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
