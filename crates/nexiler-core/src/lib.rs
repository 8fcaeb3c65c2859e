//! # Nexiler Core
//!
//! Domain layer of the Nexiler blog admin.
//! Pure business logic: the content markup codec, the authoring and dashboard
//! flows, and the ports the infrastructure crate implements.

pub mod authoring;
pub mod context;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod markup;
pub mod ports;
pub mod posts;

#[cfg(test)]
mod testing;

pub use context::{Redirect, SessionContext};
pub use error::{Field, FieldErrors, OversizedInputError, StoreError};
pub use posts::PostCollection;
