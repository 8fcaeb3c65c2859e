//! Application state - shared across all handlers.

use std::sync::Arc;

use nexiler_core::ports::{ContentStore, PasswordService, TokenService, UserRepository};
use nexiler_core::posts::PostCollection;
use nexiler_infra::{
    Argon2PasswordService, InMemoryContentStore, InMemoryUserRepository, JwtTokenService,
    LocalAuthProvider,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub users: Arc<dyn UserRepository>,
    pub passwords: Arc<dyn PasswordService>,
    pub tokens: Arc<dyn TokenService>,
    pub collection: String,
    pub cookie_secure: bool,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let store = Self::content_store(config).await?;

        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
        let users = Arc::new(InMemoryUserRepository::new());
        match &config.admin {
            Some(admin) => {
                users
                    .seed(&admin.email, &admin.password, passwords.as_ref())
                    .await?;
            }
            None => tracing::warn!("ADMIN_EMAIL/ADMIN_PASSWORD not set. Nobody can sign in."),
        }

        tracing::info!(collection = %config.collection, "Application state initialized");

        Ok(Self {
            store,
            users,
            passwords,
            tokens: Arc::new(JwtTokenService::from_env()),
            collection: config.collection.clone(),
            cookie_secure: config.cookie_secure,
        })
    }

    #[cfg(feature = "postgres")]
    async fn content_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ContentStore>> {
        match &config.database {
            Some(db_config) => {
                let db = nexiler_infra::database::connect(db_config).await?;
                Ok(Arc::new(nexiler_infra::PostgresContentStore::new(db)))
            }
            None => {
                tracing::warn!("DATABASE_URL not set. Running on the in-memory store.");
                Ok(Arc::new(InMemoryContentStore::new()))
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn content_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ContentStore>> {
        if config.database.is_some() {
            tracing::warn!("Built without postgres feature - ignoring DATABASE_URL");
        }
        Ok(Arc::new(InMemoryContentStore::new()))
    }

    /// Typed view of the blog collection.
    pub fn posts(&self) -> PostCollection {
        PostCollection::new(self.store.clone(), self.collection.clone())
    }

    /// A fresh, signed-out auth session.
    pub fn auth_provider(&self) -> LocalAuthProvider {
        LocalAuthProvider::new(self.users.clone(), self.passwords.clone(), self.tokens.clone())
    }
}

#[cfg(test)]
pub mod test_support {
    use nexiler_infra::{JwtConfig, JwtTokenService};

    use super::*;

    pub const ADMIN_EMAIL: &str = "admin@nexiler.test";
    pub const ADMIN_PASSWORD: &str = "correct-horse";

    /// In-memory state with one seeded admin account.
    pub async fn state() -> AppState {
        state_with_store().await.0
    }

    /// Like [`state`], also handing back the store for inspection.
    pub async fn state_with_store() -> (AppState, Arc<InMemoryContentStore>) {
        let store = Arc::new(InMemoryContentStore::new());
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
        let users = Arc::new(InMemoryUserRepository::new());
        users
            .seed(ADMIN_EMAIL, ADMIN_PASSWORD, passwords.as_ref())
            .await
            .unwrap();

        let state = AppState {
            store: store.clone(),
            users,
            passwords,
            tokens: Arc::new(JwtTokenService::new(JwtConfig {
                secret: "test-secret".to_string(),
                ..JwtConfig::default()
            })),
            collection: "blogs".to_string(),
            cookie_secure: true,
        };
        (state, store)
    }

    /// A valid session token for the seeded admin.
    pub async fn admin_token(state: &AppState) -> String {
        use nexiler_core::ports::AuthProvider;

        state
            .auth_provider()
            .sign_in(ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .unwrap()
            .token
    }
}
