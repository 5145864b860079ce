//! Business logic: the credential lifecycle.

pub mod credentials;

pub use credentials::{CredentialError, CredentialService, RegisterUser};
