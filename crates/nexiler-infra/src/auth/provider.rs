//! Auth provider backed by the local user repository, Argon2 and JWT.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use nexiler_core::domain::mask_email;
use nexiler_core::ports::{
    AuthError, AuthListener, AuthProvider, AuthUser, PasswordService, Subscription, TokenService,
    UserRepository,
};

const ADMIN_ROLE: &str = "admin";

#[derive(Default)]
struct SessionState {
    user: Option<AuthUser>,
    listeners: BTreeMap<u64, Arc<AuthListener>>,
    next_listener: u64,
}

/// One client session against the local account store.
///
/// The HTTP layer builds one per request and restores it from the bearer
/// token, so the signed-in user never outlives the request that proved it.
pub struct LocalAuthProvider {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
    session: Arc<Mutex<SessionState>>,
}

impl LocalAuthProvider {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
            session: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    /// Resume a session from a token issued by [`AuthProvider::sign_in`].
    ///
    /// The account must still exist.
    pub async fn restore(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = self.tokens.validate_token(token)?;
        let account = self
            .users
            .find_by_id(claims.user_id)
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?
            .ok_or_else(|| AuthError::InvalidToken("unknown account".to_string()))?;

        let user = AuthUser {
            id: account.id,
            email: account.email,
            token: token.to_string(),
        };
        self.set_user(Some(user.clone()));
        Ok(user)
    }

    pub fn token_lifetime_seconds(&self) -> i64 {
        self.tokens.expiration_seconds()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_user(&self, user: Option<AuthUser>) {
        let listeners: Vec<Arc<AuthListener>> = {
            let mut session = self.lock();
            session.user = user.clone();
            session.listeners.values().cloned().collect()
        };
        for listener in listeners {
            listener(user.clone());
        }
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let masked = mask_email(email);
        let account = self
            .users
            .find_by_email(email)
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        let Some(account) = account else {
            self.passwords.verify_missing(password);
            tracing::warn!(user_email = %masked, "Sign-in for unknown account");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.passwords.verify(password, &account.password_hash)? {
            tracing::warn!(user_email = %masked, "Sign-in with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token =
            self.tokens
                .generate_token(account.id, &account.email, vec![ADMIN_ROLE.to_string()])?;
        let user = AuthUser {
            id: account.id,
            email: account.email,
            token,
        };

        tracing::info!(user_id = %user.id, user_email = %masked, "User signed in");
        self.set_user(Some(user.clone()));
        Ok(user)
    }

    fn on_auth_state_changed(&self, listener: AuthListener) -> Subscription {
        let listener = Arc::new(listener);
        let (key, current) = {
            let mut session = self.lock();
            let key = session.next_listener;
            session.next_listener += 1;
            session.listeners.insert(key, listener.clone());
            (key, session.user.clone())
        };
        listener(current);

        let session = self.session.clone();
        Subscription::new(move || {
            session
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .listeners
                .remove(&key);
        })
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(user) = self.current_user() {
            tracing::info!(user_id = %user.id, "User signed out");
        }
        self.set_user(None);
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.lock().user.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::auth::{Argon2PasswordService, InMemoryUserRepository, JwtConfig, JwtTokenService};

    async fn provider() -> LocalAuthProvider {
        let passwords = Arc::new(Argon2PasswordService::new());
        let users = Arc::new(InMemoryUserRepository::new());
        users
            .seed("admin@nexiler.test", "correct-horse", passwords.as_ref())
            .await
            .unwrap();
        let tokens = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "test-secret".to_string(),
            ..JwtConfig::default()
        }));
        LocalAuthProvider::new(users, passwords, tokens)
    }

    #[tokio::test]
    async fn test_sign_in_and_restore() {
        let auth = provider().await;

        let user = auth.sign_in("admin@nexiler.test", "correct-horse").await.unwrap();
        assert_eq!(auth.current_user(), Some(user.clone()));

        let fresh = LocalAuthProvider::new(
            auth.users.clone(),
            auth.passwords.clone(),
            auth.tokens.clone(),
        );
        assert!(fresh.current_user().is_none());
        let restored = fresh.restore(&user.token).await.unwrap();
        assert_eq!(restored.id, user.id);
        assert_eq!(fresh.current_user().map(|u| u.email), Some("admin@nexiler.test".to_string()));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_the_same() {
        let auth = provider().await;

        let wrong = auth.sign_in("admin@nexiler.test", "nope-nope").await.unwrap_err();
        let unknown = auth.sign_in("ghost@nexiler.test", "correct-horse").await.unwrap_err();

        assert_eq!(wrong.to_string(), "Invalid email or password.");
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert!(auth.current_user().is_none());
    }

    /// Counts verifications while delegating to Argon2.
    #[derive(Default)]
    struct CountingPasswords {
        inner: Argon2PasswordService,
        verified: AtomicUsize,
        missing: AtomicUsize,
    }

    impl PasswordService for CountingPasswords {
        fn hash(&self, password: &str) -> Result<String, AuthError> {
            self.inner.hash(password)
        }

        fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
            self.verified.fetch_add(1, Ordering::SeqCst);
            self.inner.verify(password, hash)
        }

        fn verify_missing(&self, password: &str) {
            self.missing.fetch_add(1, Ordering::SeqCst);
            self.inner.verify_missing(password);
        }
    }

    #[tokio::test]
    async fn test_unknown_email_still_pays_for_a_hash_check() {
        let passwords = Arc::new(CountingPasswords::default());
        let users = Arc::new(InMemoryUserRepository::new());
        users
            .seed("admin@nexiler.test", "correct-horse", passwords.as_ref())
            .await
            .unwrap();
        let tokens = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "test-secret".to_string(),
            ..JwtConfig::default()
        }));
        let auth = LocalAuthProvider::new(users, passwords.clone(), tokens);

        let err = auth.sign_in("ghost@nexiler.test", "correct-horse").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(passwords.missing.load(Ordering::SeqCst), 1);
        assert_eq!(passwords.verified.load(Ordering::SeqCst), 0);

        auth.sign_in("admin@nexiler.test", "wrong-horse").await.unwrap_err();
        assert_eq!(passwords.missing.load(Ordering::SeqCst), 1);
        assert_eq!(passwords.verified.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_listener_sees_current_state_then_changes() {
        let auth = provider().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let signed_in = Arc::new(Mutex::new(Vec::new()));

        let counter = calls.clone();
        let seen = signed_in.clone();
        let subscription = auth.on_auth_state_changed(Box::new(move |user| {
            counter.fetch_add(1, Ordering::SeqCst);
            seen.lock().unwrap().push(user.is_some());
        }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        auth.sign_in("admin@nexiler.test", "correct-horse").await.unwrap();
        auth.sign_out().await.unwrap();
        assert_eq!(*signed_in.lock().unwrap(), vec![false, true, false]);

        subscription.unsubscribe();
        auth.sign_in("admin@nexiler.test", "correct-horse").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_restore_rejects_garbage() {
        let auth = provider().await;
        assert!(auth.restore("not-a-token").await.is_err());
        assert!(auth.current_user().is_none());
    }
}
