//! Bearer-token gate: extracts and validates the `Authorization` header.

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use thiserror::Error;
use tracing::debug;

use crate::auth::{Claims, TokenError};
use crate::handlers::http::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Why a request was refused at the gate. Every variant maps to 401.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthRejection {
    #[error("Authorization header required")]
    MissingHeader,

    #[error("Bearer token required")]
    MissingBearerPrefix,

    #[error("Token required")]
    EmptyToken,

    #[error("Invalid token")]
    Token(#[from] TokenError),
}

/// Pull the token out of an `Authorization` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthRejection> {
    let header = match header {
        Some(h) if !h.is_empty() => h,
        _ => return Err(AuthRejection::MissingHeader),
    };
    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthRejection::MissingBearerPrefix)?;
    if token.trim().is_empty() {
        return Err(AuthRejection::EmptyToken);
    }
    Ok(token)
}

/// Extractor: claims of a valid bearer token.
#[derive(Clone, Debug)]
pub struct AuthUser(pub Claims);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| AuthRejection::MissingBearerPrefix)?),
            None => None,
        };
        let token = bearer_token(header)?;
        let claims = state.tokens().validate_token(token).map_err(|e| {
            debug!(error = %e, "rejected bearer token");
            AuthRejection::Token(e)
        })?;
        Ok(AuthUser(claims))
    }
}
