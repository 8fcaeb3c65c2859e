//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Request to sign in to the admin panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public information about the signed-in admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
}

/// Successful sign-in. The token is also set as the `authToken` cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    /// Where the front end goes next: `dashboard` or `login`.
    pub redirect: String,
}

/// Authoring form submission. `content` carries real newlines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostRequest {
    pub title: String,
    pub content: String,
    pub category: String,
    pub date: String,
    pub time: String,
    /// A `data:` URL from the image upload endpoint.
    pub featured_image: Option<String>,
    /// `publish` or `draft`.
    pub intent: String,
}

/// Inline title/excerpt edit from the dashboard list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummaryPatch {
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
}

/// A stored post as the dashboard sees it. `content` is encoded markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub date: String,
    pub time: String,
    pub featured_image: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Result of a successful authoring submit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub id: String,
    pub status: String,
    pub redirect: String,
}

/// Published post in the public blog index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogSummary {
    pub id: String,
    pub title: String,
    /// Excerpt with markers stripped.
    pub excerpt: String,
    pub category: String,
    pub date: String,
    pub time: String,
    pub featured_image: String,
}

/// A single published post with its body rendered to HTML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostResponse {
    pub id: String,
    pub title: String,
    pub category: String,
    pub date: String,
    pub time: String,
    pub featured_image: String,
    pub content_html: String,
}

/// Uploaded image converted to an inline data URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadResponse {
    pub data_url: String,
    pub size: usize,
}
