use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::{Document, Record, to_record};
use crate::error::StoreError;
use crate::markup;

/// Publication state of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }

    /// Only `draft -> published` or staying put is allowed.
    pub fn can_transition_to(self, next: PostStatus) -> bool {
        !matches!((self, next), (PostStatus::Published, PostStatus::Draft))
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(format!("unknown post status: {other}")),
        }
    }
}

/// Blog categories offered by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "AI Automation")]
    AiAutomation,
    #[serde(rename = "Security")]
    Security,
    #[serde(rename = "AI Insights")]
    AiInsights,
    #[serde(rename = "Development")]
    Development,
    #[serde(rename = "Machine Learning")]
    MachineLearning,
    #[serde(rename = "Best Practices")]
    BestPractices,
    #[serde(rename = "Tutorials")]
    Tutorials,
    #[serde(rename = "Case Studies")]
    CaseStudies,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::AiAutomation,
        Category::Security,
        Category::AiInsights,
        Category::Development,
        Category::MachineLearning,
        Category::BestPractices,
        Category::Tutorials,
        Category::CaseStudies,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::AiAutomation => "AI Automation",
            Category::Security => "Security",
            Category::AiInsights => "AI Insights",
            Category::Development => "Development",
            Category::MachineLearning => "Machine Learning",
            Category::BestPractices => "Best Practices",
            Category::Tutorials => "Tutorials",
            Category::CaseStudies => "Case Studies",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// Fields written when a post is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub excerpt: String,
    /// Encoded markup, see [`markup::encode`].
    pub content: String,
    pub category: String,
    pub date: String,
    pub time: String,
    pub featured_image: String,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
}

impl NewPost {
    pub fn to_record(&self) -> Result<Record, StoreError> {
        to_record(self).map_err(|e| StoreError::InvalidRecord(e.to_string()))
    }
}

/// Partial update merged into an existing post. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
}

impl PostPatch {
    /// The inline dashboard edit: title and excerpt only.
    pub fn summary(title: impl Into<String>, excerpt: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            excerpt: Some(excerpt.into()),
            ..Self::default()
        }
    }

    pub fn to_record(&self) -> Result<Record, StoreError> {
        to_record(self).map_err(|e| StoreError::InvalidRecord(e.to_string()))
    }
}

/// Post entity - a blog post as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub date: String,
    pub time: String,
    pub featured_image: String,
    pub status: PostStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Build a post from a stored document, filling gaps with defaults:
    /// empty strings, `draft`, and today's date.
    pub fn from_document(doc: &Document) -> Self {
        let text = |key: &str| doc.get_str(key).unwrap_or_default().to_string();

        Self {
            id: doc.id,
            title: text("title"),
            excerpt: text("excerpt"),
            content: text("content"),
            category: text("category"),
            date: doc
                .get_str("date")
                .filter(|d| !d.is_empty())
                .map(str::to_string)
                .unwrap_or_else(today),
            time: text("time"),
            featured_image: text("featuredImage"),
            status: doc
                .get_str("status")
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            created_at: doc
                .get_str("createdAt")
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// Body rendered to an HTML fragment.
    pub fn content_html(&self) -> String {
        markup::render_html(&markup::decode(&self.content))
    }

    /// Excerpt with formatting markers stripped, for list views.
    pub fn excerpt_text(&self) -> String {
        markup::render_text(&markup::decode(&self.excerpt))
    }

    /// Body in editable form, line-break tokens turned back into newlines.
    pub fn content_draft(&self) -> String {
        markup::to_draft(&self.content)
    }
}

/// Today's UTC date as `YYYY-MM-DD`.
pub fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_transitions() {
        assert!(PostStatus::Draft.can_transition_to(PostStatus::Published));
        assert!(PostStatus::Draft.can_transition_to(PostStatus::Draft));
        assert!(PostStatus::Published.can_transition_to(PostStatus::Published));
        assert!(!PostStatus::Published.can_transition_to(PostStatus::Draft));
    }

    #[test]
    fn test_category_labels_round_trip() {
        for category in Category::ALL {
            assert_eq!(category.label().parse::<Category>().unwrap(), category);
        }
        assert!("Cooking".parse::<Category>().is_err());
    }

    #[test]
    fn test_new_post_record_uses_camel_case() {
        let post = NewPost {
            title: "Hello world".to_string(),
            excerpt: "Body".to_string(),
            content: "Body".to_string(),
            category: "Security".to_string(),
            date: "2025-03-01".to_string(),
            time: "5 min read".to_string(),
            featured_image: String::new(),
            status: PostStatus::Published,
            created_at: Utc::now(),
        };

        let record = post.to_record().unwrap();
        assert_eq!(record["status"], json!("published"));
        assert!(record.contains_key("featuredImage"));
        assert!(record.contains_key("createdAt"));
    }

    #[test]
    fn test_patch_only_carries_set_fields() {
        let record = PostPatch::summary("New title", "New excerpt").to_record().unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record["title"], json!("New title"));
    }

    #[test]
    fn test_from_document_fills_defaults() {
        let id = Uuid::new_v4();
        let doc = Document::new(id, json!({ "title": "Only a title", "status": "bogus" }).as_object().unwrap().clone());

        let post = Post::from_document(&doc);
        assert_eq!(post.id, id);
        assert_eq!(post.title, "Only a title");
        assert_eq!(post.status, PostStatus::Draft);
        assert_eq!(post.date, today());
        assert!(post.excerpt.is_empty());
        assert!(post.created_at.is_none());
    }

    #[test]
    fn test_from_document_reads_created_at() {
        let doc = Document::new(
            Uuid::new_v4(),
            json!({ "createdAt": "2025-01-02T03:04:05.000Z", "status": "published" })
                .as_object()
                .unwrap()
                .clone(),
        );
        let post = Post::from_document(&doc);
        assert!(post.is_published());
        assert_eq!(post.created_at.unwrap().to_rfc3339(), "2025-01-02T03:04:05+00:00");
    }

    #[test]
    fn test_content_draft_decodes_breaks() {
        let doc = Document::new(
            Uuid::new_v4(),
            json!({ "content": "a[BR]b" }).as_object().unwrap().clone(),
        );
        assert_eq!(Post::from_document(&doc).content_draft(), "a\nb");
    }

    #[test]
    fn test_rendered_views() {
        let doc = Document::new(
            Uuid::new_v4(),
            json!({ "content": "Use #care#[BR]<always>", "excerpt": "Use #care# <always>" })
                .as_object()
                .unwrap()
                .clone(),
        );
        let post = Post::from_document(&doc);
        assert_eq!(post.content_html(), "Use <strong>care</strong><br>&lt;always&gt;");
        assert_eq!(post.excerpt_text(), "Use care <always>");
    }
}
