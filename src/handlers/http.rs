//! Shared state plus the service banner and health probe.

use axum::{http::StatusCode, Json};
use serde::Serialize;
use serde_json::json;

use crate::auth::TokenService;
use crate::services::CredentialService;

/// Shared application state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub credentials: CredentialService,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(credentials: CredentialService, tokens: TokenService) -> Self {
        Self {
            credentials,
            tokens,
        }
    }
    pub fn credentials(&self) -> &CredentialService {
        &self.credentials
    }
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
    pub version: &'static str,
}

/// GET /
pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "User authentication API",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /health: liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": env!("CARGO_PKG_NAME") })),
    )
}
