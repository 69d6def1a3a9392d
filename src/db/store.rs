//! Credential store boundary.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewUser, User, UserCredentials};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A user with the same normalized email already exists.
    #[error("email already registered")]
    Duplicate,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence for user records keyed by normalized email.
///
/// `create` must be atomic per email: of two concurrent creates for the
/// same address, exactly one succeeds and the other gets
/// [`StoreError::Duplicate`].
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Look up a user without its password hash.
    async fn find_public(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Look up a user together with its password hash.
    async fn find_with_secret(&self, email: &str) -> Result<Option<UserCredentials>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
}
