//! # Nexiler Shared
//!
//! Wire types shared between the admin front end and the API server.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
