//! Admin post handlers: live list, authoring submit, inline edit, delete.

use std::sync::{Arc, Mutex, PoisonError};

use actix_web::http::header;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use tokio::sync::{oneshot, watch};
use uuid::Uuid;

use nexiler_core::Redirect;
use nexiler_core::authoring::{AuthoringSession, SubmitIntent};
use nexiler_core::dashboard::{Confirmation, Dashboard, InlineEdit};
use nexiler_core::domain::Post;
use nexiler_core::error::{Field, StoreError};
use nexiler_core::ports::AuthProvider;
use nexiler_core::posts::PostCollection;
use nexiler_shared::{ApiResponse, ErrorResponse};
use nexiler_shared::dto::{PostRequest, PostResponse, PostSummaryPatch, SubmitResponse};

use super::auth::redirect_name;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

pub(crate) fn to_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id.to_string(),
        title: post.title,
        excerpt: post.excerpt,
        content: post.content,
        category: post.category,
        date: post.date,
        time: post.time,
        featured_image: post.featured_image,
        status: post.status.to_string(),
        created_at: post.created_at.map(|t| t.to_rfc3339()),
    }
}

/// Subscribe, take the first ordered snapshot, unsubscribe.
pub(crate) async fn current_snapshot(posts: &PostCollection) -> AppResult<Vec<Post>> {
    let (tx, rx) = oneshot::channel();
    let tx = Mutex::new(Some(tx));
    let subscription = posts
        .subscribe(move |snapshot| {
            if let Some(tx) = tx.lock().unwrap_or_else(PoisonError::into_inner).take() {
                let _ = tx.send(snapshot);
            }
        })
        .await?;

    let snapshot = rx
        .await
        .map_err(|_| AppError::Internal("Post subscription ended early".to_string()))?;
    subscription.unsubscribe();
    Ok(snapshot?)
}

fn sse_event(name: &str, payload: &str) -> web::Bytes {
    web::Bytes::from(format!("event: {name}\ndata: {payload}\n\n"))
}

/// Encode one delivery as a `snapshot` event, or an `error` event carrying
/// the store message.
fn snapshot_event(snapshot: Result<Vec<Post>, StoreError>) -> Option<web::Bytes> {
    let encoded = match snapshot {
        Ok(posts) => {
            let body: Vec<PostResponse> = posts.into_iter().map(to_response).collect();
            serde_json::to_string(&body).map(|payload| sse_event("snapshot", &payload))
        }
        Err(e) => {
            let problem = ErrorResponse::new(502, "Store Error").with_detail(e.to_string());
            serde_json::to_string(&problem).map(|payload| sse_event("error", &payload))
        }
    };
    match encoded {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode stream event");
            None
        }
    }
}

fn parse_intent(intent: &str) -> AppResult<SubmitIntent> {
    match intent.trim().to_ascii_lowercase().as_str() {
        "publish" | "published" => Ok(SubmitIntent::Publish),
        "draft" | "save_draft" => Ok(SubmitIntent::SaveDraft),
        other => Err(AppError::BadRequest(format!(
            "Unknown intent '{other}', expected 'publish' or 'draft'"
        ))),
    }
}

/// Copy the form into the session. An unusable image is reported together
/// with the rest of the draft's problems.
fn fill(session: &mut AuthoringSession, req: PostRequest) -> AppResult<()> {
    session.set_title(req.title);
    session.set_content(req.content);
    session.set_category(req.category);
    session.set_date(req.date);
    session.set_time(req.time);

    match req.featured_image.filter(|url| !url.is_empty()) {
        Some(url) => {
            if !session.set_image_url(url) {
                let mut errors = session.draft().validate();
                if let Some(message) = session.errors().get(Field::Image) {
                    errors.insert(Field::Image, message);
                }
                return Err(errors.into());
            }
        }
        None => session.remove_image(),
    }
    Ok(())
}

fn authoring_session(state: &AppState, identity: &Identity, existing: Option<&Post>) -> AppResult<AuthoringSession> {
    let auth: Arc<dyn AuthProvider> = identity.session.clone();
    let mut session = match existing {
        Some(post) => AuthoringSession::for_existing(state.posts(), auth, post),
        None => AuthoringSession::new(state.posts(), auth),
    };
    session
        .check_auth()
        .map_err(|_| AppError::unauthenticated())?;
    Ok(session)
}

/// GET /api/admin/posts
pub async fn list_posts(_identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = current_snapshot(&state.posts()).await?;
    let body: Vec<PostResponse> = posts.into_iter().map(to_response).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(body)))
}

/// GET /api/admin/posts/stream - one `snapshot` event per change.
///
/// Only the newest snapshot is kept per client; a slow reader skips the ones
/// it missed.
pub async fn stream_posts(identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let (tx, rx) = watch::channel::<Result<Vec<Post>, StoreError>>(Ok(Vec::new()));
    let subscription = state
        .posts()
        .subscribe(move |snapshot| {
            let _ = tx.send(snapshot);
        })
        .await?;

    tracing::info!(user_id = %identity.user.id, "Post stream opened");

    // The subscription rides along in the stream state; a client disconnect
    // drops the stream and with it the subscription.
    let events = futures::stream::unfold((rx, subscription), |(mut rx, subscription)| async move {
        rx.changed().await.ok()?;
        let snapshot = rx.borrow_and_update().clone();
        let event = snapshot_event(snapshot)?;
        Some((Ok::<_, actix_web::Error>(event), (rx, subscription)))
    });

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(events))
}

/// POST /api/admin/posts
pub async fn create_post(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let intent = parse_intent(&req.intent)?;

    let mut session = authoring_session(&state, &identity, None)?;
    fill(&mut session, req)?;
    let id = session.submit(intent).await?;

    Ok(HttpResponse::Created().json(SubmitResponse {
        id: id.to_string(),
        status: intent.status().to_string(),
        redirect: redirect_name(Redirect::Dashboard),
    }))
}

/// PUT /api/admin/posts/{id} - re-edit a stored post.
pub async fn update_post(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let req = body.into_inner();
    let intent = parse_intent(&req.intent)?;

    let existing = state
        .posts()
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {id} not found")))?;

    let mut session = authoring_session(&state, &identity, Some(&existing))?;
    fill(&mut session, req)?;
    session.submit(intent).await?;

    Ok(HttpResponse::Ok().json(SubmitResponse {
        id: id.to_string(),
        status: intent.status().to_string(),
        redirect: redirect_name(Redirect::Dashboard),
    }))
}

/// PATCH /api/admin/posts/{id} - inline title/excerpt edit.
pub async fn patch_post(
    _identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<PostSummaryPatch>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let patch = body.into_inner();
    let posts = state.posts();

    InlineEdit {
        id,
        title: patch.title,
        excerpt: patch.excerpt,
    }
    .save(&posts)
    .await?;

    let post = posts
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {id} not found")))?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(to_response(post))))
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// DELETE /api/admin/posts/{id}?confirm=true
pub async fn delete_post(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<DeleteQuery>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let confirmation = if query.confirm {
        Confirmation::Confirmed
    } else {
        Confirmation::Declined
    };

    let auth: Arc<dyn AuthProvider> = identity.session.clone();
    let mut dashboard = Dashboard::new(state.posts(), auth);
    dashboard
        .authorize()
        .map_err(|_| AppError::unauthenticated())?;

    if !dashboard.delete(id, confirmation).await? {
        return Err(AppError::BadRequest(
            "Deletion must be confirmed with confirm=true".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(id.to_string(), "Post deleted")))
}
