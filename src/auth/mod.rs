//! Authentication: password hashing, session tokens, HTTP handlers.

mod handlers;
mod jwt;
pub(crate) mod password;

pub use handlers::{signin, signup, verify};
pub use jwt::{Claims, TokenError, TokenIssuer, TokenVerifier};
pub use password::{HashCost, PasswordHasher};
