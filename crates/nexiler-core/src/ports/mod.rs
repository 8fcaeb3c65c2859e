//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod content_store;
mod repository;
mod subscription;

pub use auth::{
    AuthError, AuthListener, AuthProvider, AuthUser, PasswordService, TokenClaims, TokenService,
};
pub use content_store::{ContentStore, Direction, OrderBy, Snapshot, SnapshotListener};
pub use repository::UserRepository;
pub use subscription::Subscription;
