//! Domain entities - the core business objects.

mod document;
mod post;
mod user;

pub use document::{Document, Record, to_record};
pub use post::{Category, NewPost, Post, PostPatch, PostStatus, today};
pub use user::{User, mask_email};
