//! User registration, login and profile API.
//!
//! Passwords are stored as Argon2id hashes; sessions are stateless HS256 bearer tokens
//! valid for 24 hours. Storage is pluggable through [`repositories::UserStore`].

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;

pub use config::Config;
pub use error::AppError;
pub use handlers::http::AppState;
pub use services::CredentialService;

use axum::routing::{get, post};
use handlers::http;

/// Build the API router. Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/", get(http::index))
        .route("/health", get(http::health))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .with_state(state)
}
