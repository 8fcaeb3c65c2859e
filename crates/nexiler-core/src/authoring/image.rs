//! Featured image handling: uploads become self-contained data URLs.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

use crate::error::OversizedInputError;

/// Largest accepted featured image, in bytes.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// A file picked by the author.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            content_type: content_type.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error(transparent)]
    Oversized(#[from] OversizedInputError),

    #[error("Unsupported image type: {0}")]
    NotAnImage(String),
}

/// Inline image stored with the post, as a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturedImage(String);

impl FeaturedImage {
    /// Convert an upload. Oversized or non-image files are refused.
    pub fn from_upload(upload: &ImageUpload) -> Result<Self, ImageError> {
        if upload.bytes.len() > MAX_IMAGE_BYTES {
            return Err(OversizedInputError {
                size: upload.bytes.len(),
                limit: MAX_IMAGE_BYTES,
            }
            .into());
        }

        let mime = upload.content_type.trim().to_ascii_lowercase();
        if !mime.starts_with("image/") {
            return Err(ImageError::NotAnImage(upload.content_type.clone()));
        }

        let payload = STANDARD.encode(&upload.bytes);
        Ok(Self(format!("data:{mime};base64,{payload}")))
    }

    /// Wrap a data URL that was already produced elsewhere, e.g. by the upload
    /// endpoint. Anything that is not an image data URL is refused.
    pub fn from_data_url(url: impl Into<String>) -> Result<Self, ImageError> {
        let url = url.into();
        let Some((_, payload)) = url
            .strip_prefix("data:image/")
            .and_then(|rest| rest.split_once(";base64,"))
        else {
            return Err(ImageError::NotAnImage("expected an image data URL".to_string()));
        };

        let padding = payload.bytes().rev().take_while(|b| *b == b'=').count();
        let size = (payload.len() / 4 * 3).saturating_sub(padding);
        if size > MAX_IMAGE_BYTES {
            return Err(OversizedInputError {
                size,
                limit: MAX_IMAGE_BYTES,
            }
            .into());
        }
        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_png_becomes_data_url() {
        let image = FeaturedImage::from_upload(&ImageUpload::new("image/png", vec![1, 2, 3])).unwrap();
        assert_eq!(image.as_str(), "data:image/png;base64,AQID");
    }

    #[test]
    fn test_exactly_ten_megabytes_is_accepted() {
        let upload = ImageUpload::new("image/jpeg", vec![0; MAX_IMAGE_BYTES]);
        assert!(FeaturedImage::from_upload(&upload).is_ok());
    }

    #[test]
    fn test_oversized_upload_is_rejected() {
        let upload = ImageUpload::new("image/jpeg", vec![0; MAX_IMAGE_BYTES + 1]);
        let err = FeaturedImage::from_upload(&upload).unwrap_err();
        assert!(matches!(err, ImageError::Oversized(_)));
        assert_eq!(err.to_string(), "Image size must be less than 10MB");
    }

    #[test]
    fn test_non_image_is_rejected() {
        let upload = ImageUpload::new("application/pdf", vec![1]);
        assert!(matches!(
            FeaturedImage::from_upload(&upload),
            Err(ImageError::NotAnImage(_))
        ));
    }

    #[test]
    fn test_from_data_url() {
        assert!(FeaturedImage::from_data_url("data:image/gif;base64,R0lG").is_ok());
        assert!(FeaturedImage::from_data_url("https://cdn.example.com/x.png").is_err());
    }

    #[test]
    fn test_data_url_of_largest_upload_is_accepted_again() {
        let upload = ImageUpload::new("image/png", vec![0; MAX_IMAGE_BYTES]);
        let url = FeaturedImage::from_upload(&upload).unwrap().into_string();
        assert!(FeaturedImage::from_data_url(url).is_ok());

        let too_big = format!("data:image/png;base64,{}", "A".repeat(MAX_IMAGE_BYTES / 3 * 4 + 8));
        assert!(matches!(
            FeaturedImage::from_data_url(too_big),
            Err(ImageError::Oversized(_))
        ));
    }
}
