use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::User;
use crate::error::StoreError;

/// Admin account repository backing the auth provider.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Find a user by their email address (case-insensitive).
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert or replace a user.
    async fn save(&self, user: User) -> Result<User, StoreError>;
}
