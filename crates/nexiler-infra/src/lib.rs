//! # Nexiler Infrastructure
//!
//! Concrete implementations of the ports defined in `nexiler-core`:
//! document stores and the local auth provider.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory store only
//! - `postgres` - PostgreSQL document store via SeaORM
//! - `auth` - JWT + Argon2 authentication

pub mod database;
pub mod store;

#[cfg(feature = "auth")]
pub mod auth;

pub use database::DatabaseConfig;
pub use store::InMemoryContentStore;

#[cfg(feature = "postgres")]
pub use store::PostgresContentStore;

#[cfg(feature = "auth")]
pub use auth::{
    Argon2PasswordService, InMemoryUserRepository, JwtConfig, JwtTokenService, LocalAuthProvider,
};
