//! Authentication: password hashing, JWT, register/login/me handlers.

mod handlers;
pub mod jwt;
pub mod password;

pub use handlers::{login, me, register};
pub use jwt::{Claims, TokenError, TokenService};
pub use password::{PasswordError, PasswordHasher};
