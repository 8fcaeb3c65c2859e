//! Content store implementations.

mod memory;
mod notify;

pub use memory::InMemoryContentStore;
pub use notify::{ChangeHub, SnapshotLoader};

#[cfg(feature = "postgres")]
pub mod entity;
#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "postgres")]
pub use postgres::PostgresContentStore;
