//! Business logic: registration, login, and session verification.

pub mod auth;

pub use auth::{normalize_email, AuthOutcome, AuthService, LoginInput, RegisterInput};
