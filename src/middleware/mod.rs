//! Middleware: request extractors for authenticated routes.

pub mod auth;

pub use auth::AuthSession;
