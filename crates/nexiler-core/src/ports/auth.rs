//! Authentication ports.

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use super::Subscription;

/// Claims stored in session tokens.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub email: String,
    pub roles: Vec<String>,
    pub exp: i64,
}

/// Token service trait for session token operations.
pub trait TokenService: Send + Sync {
    /// Generate a session token for a user.
    fn generate_token(
        &self,
        user_id: Uuid,
        email: &str,
        roles: Vec<String>,
    ) -> Result<String, AuthError>;

    /// Validate and decode a token.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of freshly generated tokens.
    fn expiration_seconds(&self) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;

    /// Run a verification that always fails, for sign-ins that matched no
    /// account. Takes as long as a [`verify`](Self::verify) with a wrong password.
    fn verify_missing(&self, password: &str);
}

/// A signed-in principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    /// Session token handed to the browser.
    #[serde(skip)]
    pub token: String,
}

/// Listener for auth-state changes; `None` means signed out.
pub type AuthListener = Box<dyn Fn(Option<AuthUser>) + Send + Sync>;

/// Auth provider - sign in, observe and end a session.
///
/// An instance represents one client session, the same way a browser holds a
/// single signed-in user at a time.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Verify credentials and make the user current.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    /// Register a listener. It is called with the current state before this
    /// returns, then again on every change until the handle is released.
    fn on_auth_state_changed(&self, listener: AuthListener) -> Subscription;

    /// Clear the current user.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Snapshot of the current user.
    fn current_user(&self) -> Option<AuthUser>;
}

/// Authentication errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    /// Deliberately vague so responses do not reveal which part was wrong.
    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Authentication required")]
    MissingAuth,

    #[error("Hashing error: {0}")]
    HashingError(String),

    #[error("Auth provider failure: {0}")]
    Provider(String),
}
