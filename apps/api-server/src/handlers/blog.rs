//! Public blog reader.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use nexiler_core::domain::Post;
use nexiler_shared::ApiResponse;
use nexiler_shared::dto::{BlogPostResponse, BlogSummary};

use super::posts::current_snapshot;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn summary(post: Post) -> BlogSummary {
    BlogSummary {
        id: post.id.to_string(),
        excerpt: post.excerpt_text(),
        title: post.title,
        category: post.category,
        date: post.date,
        time: post.time,
        featured_image: post.featured_image,
    }
}

/// GET /api/blog - published posts, newest first.
pub async fn list_published(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts: Vec<BlogSummary> = current_snapshot(&state.posts())
        .await?
        .into_iter()
        .filter(Post::is_published)
        .map(summary)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}

/// GET /api/blog/{id}
pub async fn get_published(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let post = state
        .posts()
        .get(id)
        .await?
        .filter(Post::is_published)
        .ok_or_else(|| AppError::NotFound(format!("Post {id} not found")))?;

    Ok(HttpResponse::Ok().json(BlogPostResponse {
        id: post.id.to_string(),
        content_html: post.content_html(),
        title: post.title,
        category: post.category,
        date: post.date,
        time: post.time,
        featured_image: post.featured_image,
    }))
}
