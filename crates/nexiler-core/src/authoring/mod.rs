//! Post authoring: draft state, formatting toolbar, image attachment and the
//! validated submit path.

mod draft;
mod image;
mod session;

pub use draft::{CONTENT_MIN_CHARS, Draft, TITLE_MAX_CHARS, TITLE_MIN_CHARS};
pub use image::{FeaturedImage, ImageError, ImageUpload, MAX_IMAGE_BYTES};
pub use session::{AuthoringSession, SessionState, SubmitError, SubmitIntent};
