//! In-memory admin account repository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use nexiler_core::domain::{User, mask_email};
use nexiler_core::error::StoreError;
use nexiler_core::ports::{PasswordService, UserRepository};

/// Admin accounts held in memory, seeded at startup.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash `password` and store an account for `email`, replacing any
    /// existing account with the same address.
    pub async fn seed(
        &self,
        email: &str,
        password: &str,
        passwords: &dyn PasswordService,
    ) -> Result<User, StoreError> {
        let hash = passwords
            .hash(password)
            .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;

        let mut user = User::new(email.trim().to_lowercase(), hash);
        if let Some(existing) = self.find_by_email(email).await? {
            user.id = existing.id;
            user.created_at = existing.created_at;
        }

        tracing::info!(user_email = %mask_email(&user.email), "Admin account seeded");
        self.save(user).await
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");
        let email = email.trim();
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn save(&self, user: User) -> Result<User, StoreError> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(user)
    }
}
