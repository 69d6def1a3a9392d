//! Process-local credential store. Used when no database is configured and in tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CredentialStore, StoreError};
use crate::models::{NewUser, User, UserCredentials};

#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    users: Arc<RwLock<HashMap<String, UserCredentials>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a user by email. Returns whether a record was removed.
    pub async fn remove(&self, email: &str) -> bool {
        self.users.write().await.remove(email).is_some()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&new_user.email) {
            return Err(StoreError::Duplicate);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email.clone(),
            created_at: Utc::now(),
        };
        users.insert(
            new_user.email,
            UserCredentials {
                user: user.clone(),
                password_hash: new_user.password_hash,
            },
        );
        Ok(user)
    }

    async fn find_public(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(email).map(|c| c.user.clone()))
    }

    async fn find_with_secret(&self, email: &str) -> Result<Option<UserCredentials>, StoreError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|c| c.user.id == id)
            .map(|c| c.user.clone()))
    }
}
