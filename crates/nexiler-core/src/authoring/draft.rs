//! In-memory authoring state and its validation gate.

use chrono::{DateTime, NaiveDate, Utc};

use super::image::FeaturedImage;
use crate::domain::{Category, NewPost, Post, PostPatch, PostStatus, today};
use crate::error::{Field, FieldErrors};
use crate::markup;

pub const TITLE_MIN_CHARS: usize = 5;
pub const TITLE_MAX_CHARS: usize = 100;
pub const CONTENT_MIN_CHARS: usize = 50;

/// Unsaved post fields. `content` holds real newlines, not `[BR]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub content: String,
    pub category: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// Read-time label, e.g. "5 min read".
    pub time: String,
    pub featured_image: Option<FeaturedImage>,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            category: String::new(),
            date: today(),
            time: String::new(),
            featured_image: None,
        }
    }
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a stored post for editing. The content is decoded first so that
    /// saving it again does not double-encode line breaks.
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            content: post.content_draft(),
            category: post.category.clone(),
            date: post.date.clone(),
            time: post.time.clone(),
            featured_image: FeaturedImage::from_data_url(post.featured_image.clone()).ok(),
        }
    }

    /// Check every field and report all problems at once.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        let title_len = self.title.chars().count();
        if self.title.trim().is_empty() {
            errors.insert(Field::Title, "Title is required");
        } else if title_len < TITLE_MIN_CHARS {
            errors.insert(Field::Title, "Title must be at least 5 characters");
        } else if title_len > TITLE_MAX_CHARS {
            errors.insert(Field::Title, "Title must be at most 100 characters");
        }

        if self.content.trim().is_empty() {
            errors.insert(Field::Content, "Content is required");
        } else if self.content.chars().count() < CONTENT_MIN_CHARS {
            errors.insert(Field::Content, "Content must be at least 50 characters");
        }

        let category = self.category.trim();
        if category.is_empty() {
            errors.insert(Field::Category, "Category is required");
        } else if category.parse::<Category>().is_err() {
            errors.insert(Field::Category, "Please choose one of the listed categories");
        }

        if self.date.trim().is_empty() {
            errors.insert(Field::Date, "Date is required");
        } else if NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").is_err() {
            errors.insert(Field::Date, "Date must be in YYYY-MM-DD format");
        }

        if self.time.trim().is_empty() {
            errors.insert(Field::Time, "Read time is required");
        }

        errors
    }

    /// Record for a first save. Content is encoded, the excerpt derived from
    /// the unencoded text.
    pub fn to_new_post(&self, status: PostStatus, created_at: DateTime<Utc>) -> NewPost {
        NewPost {
            title: self.title.clone(),
            excerpt: markup::derive_excerpt(&self.content),
            content: markup::encode(&self.content),
            category: self.category.trim().to_string(),
            date: self.date.trim().to_string(),
            time: self.time.clone(),
            featured_image: self.image_url().to_string(),
            status,
            created_at,
        }
    }

    /// Patch for re-saving an existing post. `createdAt` is never touched.
    pub fn to_patch(&self, status: PostStatus) -> PostPatch {
        PostPatch {
            title: Some(self.title.clone()),
            excerpt: Some(markup::derive_excerpt(&self.content)),
            content: Some(markup::encode(&self.content)),
            category: Some(self.category.trim().to_string()),
            date: Some(self.date.trim().to_string()),
            time: Some(self.time.clone()),
            featured_image: Some(self.image_url().to_string()),
            status: Some(status),
        }
    }

    fn image_url(&self) -> &str {
        self.featured_image
            .as_ref()
            .map(FeaturedImage::as_str)
            .unwrap_or_default()
    }
}
