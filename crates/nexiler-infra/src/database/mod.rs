//! Database connection management.

mod connections;

pub use connections::DatabaseConfig;

#[cfg(feature = "postgres")]
pub use connections::connect;
