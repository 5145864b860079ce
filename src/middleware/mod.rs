//! Request guards for protected routes.

pub mod auth;

pub use auth::{AuthRejection, AuthUser};
