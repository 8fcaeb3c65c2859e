//! Admin dashboard: the live post list with inline edit and delete.

mod live_list;

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

pub use live_list::LiveList;

use crate::context::{Redirect, SessionContext};
use crate::domain::{Post, PostPatch};
use crate::error::StoreError;
use crate::ports::{AuthError, AuthProvider, AuthUser, Subscription};
use crate::posts::PostCollection;

/// Answer to "Are you sure you want to delete this blog?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("Post {0} is not in the list")]
    UnknownPost(Uuid),

    #[error("No edit in progress")]
    NotEditing,

    #[error("A save is already in progress")]
    Saving,

    #[error("Authentication required")]
    Unauthenticated,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Title/excerpt edit of one post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineEdit {
    pub id: Uuid,
    pub title: String,
    pub excerpt: String,
}

impl InlineEdit {
    pub fn from_post(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
        }
    }

    /// The patch to write, or an error if the title is blank.
    pub fn to_patch(&self) -> Result<PostPatch, DashboardError> {
        if self.title.trim().is_empty() {
            return Err(DashboardError::EmptyTitle);
        }
        Ok(PostPatch::summary(self.title.clone(), self.excerpt.clone()))
    }

    /// Validate and write through to the store. The change comes back to every
    /// open list through its subscription.
    pub async fn save(&self, posts: &PostCollection) -> Result<(), DashboardError> {
        let patch = self.to_patch()?;
        posts.update(self.id, &patch).await?;
        Ok(())
    }
}

/// What a list row shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Viewing(Post),
    /// The row's edit form. It stays up while the save is in flight so the
    /// row never falls back to the stale title.
    Editing {
        post: Post,
        edit: InlineEdit,
        saving: bool,
    },
}

/// One open dashboard view.
///
/// Dropping it releases the auth and list subscriptions.
pub struct Dashboard {
    posts: PostCollection,
    auth: Arc<dyn AuthProvider>,
    context: Option<SessionContext>,
    list: LiveList,
    list_subscription: Option<Subscription>,
    editing: Option<InlineEdit>,
    saving: bool,
    banner: Option<String>,
}

impl Dashboard {
    pub fn new(posts: PostCollection, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            posts,
            auth,
            context: None,
            list: LiveList::new(),
            list_subscription: None,
            editing: None,
            saving: false,
            banner: None,
        }
    }

    /// Auth gate only. Enough for one-off edits and deletes.
    pub fn authorize(&mut self) -> Result<AuthUser, Redirect> {
        let context = SessionContext::observe(self.auth.as_ref());
        let user = context.require();
        self.context = Some(context);
        user
    }

    /// Auth gate, then subscribe to the post list ordered by date, newest
    /// first. A failed subscription or a failed re-read ends up in the banner.
    pub async fn open(&mut self) -> Result<AuthUser, Redirect> {
        let user = self.authorize()?;

        let list = self.list.clone();
        let listener = move |snapshot: Result<Vec<Post>, StoreError>| match snapshot {
            Ok(posts) => list.apply_snapshot(posts),
            Err(e) => {
                tracing::error!(error = %e, "Failed to refresh posts");
                list.record_failure(e.to_string());
            }
        };
        match self.posts.subscribe(listener).await {
            Ok(subscription) => self.list_subscription = Some(subscription),
            Err(e) => {
                tracing::error!(error = %e, "Failed to subscribe to posts");
                self.banner = Some(e.to_string());
            }
        }

        Ok(user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.context
            .as_ref()
            .is_some_and(SessionContext::is_authenticated)
    }

    pub fn list(&self) -> &LiveList {
        &self.list
    }

    pub fn posts(&self) -> Vec<Post> {
        self.list.posts()
    }

    pub fn is_loading(&self) -> bool {
        self.list.is_loading()
    }

    pub fn rows(&self) -> Vec<Row> {
        self.list
            .posts()
            .into_iter()
            .map(|post| match &self.editing {
                Some(edit) if edit.id == post.id => Row::Editing {
                    post,
                    edit: edit.clone(),
                    saving: self.saving,
                },
                _ => Row::Viewing(post),
            })
            .collect()
    }

    pub fn editing(&self) -> Option<&InlineEdit> {
        self.editing.as_ref()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn begin_edit(&mut self, id: Uuid) -> Result<(), DashboardError> {
        let post = self.list.get(id).ok_or(DashboardError::UnknownPost(id))?;
        self.editing = Some(InlineEdit::from_post(&post));
        Ok(())
    }

    pub fn edit_title(&mut self, title: impl Into<String>) {
        if let Some(edit) = self.editing.as_mut() {
            edit.title = title.into();
        }
    }

    pub fn edit_excerpt(&mut self, excerpt: impl Into<String>) {
        if let Some(edit) = self.editing.as_mut() {
            edit.excerpt = excerpt.into();
        }
    }

    pub fn cancel_edit(&mut self) {
        if !self.saving {
            self.editing = None;
        }
    }

    /// Write the inline edit through to the store. On failure the edit form
    /// stays open and the banner carries the store message.
    pub async fn save_edit(&mut self) -> Result<(), DashboardError> {
        if self.saving {
            return Err(DashboardError::Saving);
        }
        self.require_auth()?;
        let edit = self.editing.clone().ok_or(DashboardError::NotEditing)?;

        self.saving = true;
        let result = edit.save(&self.posts).await;
        self.saving = false;

        match result {
            Ok(()) => {
                self.editing = None;
                Ok(())
            }
            Err(e) => {
                if let DashboardError::Store(store) = &e {
                    tracing::error!(post_id = %edit.id, error = %store, "Failed to update post");
                    self.banner = Some(store.to_string());
                }
                Err(e)
            }
        }
    }

    /// Delete a post once the user has confirmed. Returns whether a delete was
    /// issued.
    pub async fn delete(&mut self, id: Uuid, confirmation: Confirmation) -> Result<bool, DashboardError> {
        if confirmation == Confirmation::Declined {
            return Ok(false);
        }
        self.require_auth()?;

        match self.posts.delete(id).await {
            Ok(()) => Ok(true),
            Err(e) => {
                tracing::error!(post_id = %id, error = %e, "Failed to delete post");
                self.banner = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// The last failed action, else the last failed list refresh.
    pub fn banner(&self) -> Option<String> {
        self.banner.clone().or_else(|| self.list.failure())
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
        self.list.clear_failure();
    }

    /// Sign out and release both subscriptions.
    pub async fn sign_out(&mut self) -> Result<Redirect, DashboardError> {
        self.auth.sign_out().await?;
        self.list_subscription = None;
        self.context = None;
        self.editing = None;
        Ok(Redirect::Login)
    }

    fn require_auth(&self) -> Result<(), DashboardError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(DashboardError::Unauthenticated)
        }
    }
}
