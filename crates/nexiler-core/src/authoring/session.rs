//! Authoring session state machine.
//!
//! ```text
//! Unauthenticated -> CheckingAuth -> Editing -> Submitting -> Redirected(Dashboard)
//!                          |            ^            |
//!                          v            |            v
//!                   Redirect::Login     +--------- Error (field errors, still editable)
//! ```

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use super::draft::Draft;
use super::image::{FeaturedImage, ImageError, ImageUpload};
use crate::context::{Redirect, SessionContext};
use crate::domain::{Post, PostStatus};
use crate::error::{Field, FieldErrors, StoreError};
use crate::markup::{self, FormatError, Selection, Style};
use crate::ports::{AuthProvider, AuthUser};
use crate::posts::PostCollection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    CheckingAuth,
    Editing,
    Submitting,
    Redirected(Redirect),
    /// The last submit failed; see [`AuthoringSession::errors`]. The draft is
    /// kept and can be edited again.
    Error,
}

/// Which of the two submit buttons was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitIntent {
    Publish,
    SaveDraft,
}

impl SubmitIntent {
    pub fn status(self) -> PostStatus {
        match self {
            SubmitIntent::Publish => PostStatus::Published,
            SubmitIntent::SaveDraft => PostStatus::Draft,
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("A submission is already in progress")]
    InFlight,

    #[error("The session is not editing a draft")]
    NotEditing,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Cannot move a {from} post back to {to}")]
    InvalidTransition { from: PostStatus, to: PostStatus },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
enum Target {
    Create,
    Update { id: Uuid, status: PostStatus },
}

/// Holds the session in `Submitting` for one write. If the submit future is
/// dropped before the write settles, the session goes back to `Editing`.
struct InFlight<'a> {
    state: &'a mut SessionState,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn enter(state: &'a mut SessionState) -> Self {
        *state = SessionState::Submitting;
        Self {
            state,
            settled: false,
        }
    }

    fn finish(mut self) {
        self.settled = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("Submit abandoned before the store answered");
            *self.state = SessionState::Editing;
        }
    }
}

/// One author editing one post.
pub struct AuthoringSession {
    posts: PostCollection,
    auth: Arc<dyn AuthProvider>,
    context: Option<SessionContext>,
    state: SessionState,
    draft: Draft,
    errors: FieldErrors,
    target: Target,
}

impl AuthoringSession {
    /// Session for a brand new post.
    pub fn new(posts: PostCollection, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            posts,
            auth,
            context: None,
            state: SessionState::Unauthenticated,
            draft: Draft::new(),
            errors: FieldErrors::new(),
            target: Target::Create,
        }
    }

    /// Session re-editing a stored post; submitting updates it in place.
    pub fn for_existing(posts: PostCollection, auth: Arc<dyn AuthProvider>, post: &Post) -> Self {
        Self {
            draft: Draft::from_post(post),
            target: Target::Update {
                id: post.id,
                status: post.status,
            },
            ..Self::new(posts, auth)
        }
    }

    /// Entry guard. Registers an auth-state listener that lives as long as the
    /// session and moves to `Editing` when a user is signed in.
    pub fn check_auth(&mut self) -> Result<AuthUser, Redirect> {
        self.state = SessionState::CheckingAuth;
        let context = SessionContext::observe(self.auth.as_ref());
        let outcome = context.require();
        self.context = Some(context);

        match &outcome {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, "Authoring session authenticated");
                self.state = SessionState::Editing;
            }
            Err(_) => {
                tracing::debug!("No signed-in user, redirecting to login");
                self.state = SessionState::Unauthenticated;
            }
        }

        outcome
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.state == SessionState::Submitting
    }

    /// Preview of the attached image, the same data URL that will be saved.
    pub fn image_preview(&self) -> Option<&str> {
        self.draft.featured_image.as_ref().map(FeaturedImage::as_str)
    }

    pub fn set_title(&mut self, value: impl Into<String>) {
        self.draft.title = value.into();
        self.touch(Field::Title);
    }

    pub fn set_content(&mut self, value: impl Into<String>) {
        self.draft.content = value.into();
        self.touch(Field::Content);
    }

    pub fn set_category(&mut self, value: impl Into<String>) {
        self.draft.category = value.into();
        self.touch(Field::Category);
    }

    pub fn set_date(&mut self, value: impl Into<String>) {
        self.draft.date = value.into();
        self.touch(Field::Date);
    }

    pub fn set_time(&mut self, value: impl Into<String>) {
        self.draft.time = value.into();
        self.touch(Field::Time);
    }

    /// Wrap the selected part of the content in a marker pair and return the
    /// selection covering the inserted text. An empty selection changes
    /// nothing; the error's message is meant for the author.
    pub fn apply_format(&mut self, style: Style, selection: Selection) -> Result<Selection, FormatError> {
        let formatted = markup::apply_format(&self.draft.content, selection, style)?;
        self.draft.content = formatted.text;
        self.touch(Field::Content);
        Ok(formatted.selection)
    }

    /// Attach a featured image. A rejected file leaves the draft and preview
    /// as they were and records an `image` field error.
    pub fn attach_image(&mut self, upload: &ImageUpload) -> bool {
        tracing::debug!(size = upload.bytes.len(), "Attaching image");
        self.accept_image(FeaturedImage::from_upload(upload))
    }

    /// Attach an image that was already converted to a data URL.
    pub fn set_image_url(&mut self, url: impl Into<String>) -> bool {
        self.accept_image(FeaturedImage::from_data_url(url))
    }

    fn accept_image(&mut self, image: Result<FeaturedImage, ImageError>) -> bool {
        match image {
            Ok(image) => {
                self.draft.featured_image = Some(image);
                self.errors.remove(Field::Image);
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "Image rejected");
                self.errors.insert(Field::Image, e.to_string());
                false
            }
        }
    }

    pub fn remove_image(&mut self) {
        self.draft.featured_image = None;
        self.errors.remove(Field::Image);
    }

    pub async fn publish(&mut self) -> Result<Uuid, SubmitError> {
        self.submit(SubmitIntent::Publish).await
    }

    pub async fn save_draft(&mut self) -> Result<Uuid, SubmitError> {
        self.submit(SubmitIntent::SaveDraft).await
    }

    /// Validate, encode and write the draft. One store operation per call.
    pub async fn submit(&mut self, intent: SubmitIntent) -> Result<Uuid, SubmitError> {
        match self.state {
            SessionState::Submitting => return Err(SubmitError::InFlight),
            SessionState::Editing | SessionState::Error => {}
            _ => return Err(SubmitError::NotEditing),
        }

        if !self.context.as_ref().is_some_and(SessionContext::is_authenticated) {
            self.state = SessionState::Unauthenticated;
            return Err(SubmitError::Unauthenticated);
        }

        let errors = self.draft.validate();
        if !errors.is_empty() {
            tracing::debug!(fields = %errors, "Draft failed validation");
            self.errors = errors.clone();
            self.state = SessionState::Error;
            return Err(SubmitError::Validation(errors));
        }

        let status = intent.status();
        if let Target::Update { status: current, .. } = self.target {
            if !current.can_transition_to(status) {
                self.errors
                    .insert(Field::Submit, "Published posts cannot be moved back to draft");
                self.state = SessionState::Error;
                return Err(SubmitError::InvalidTransition {
                    from: current,
                    to: status,
                });
            }
        }

        self.errors.clear();
        let in_flight = InFlight::enter(&mut self.state);

        let result = match self.target {
            Target::Create => {
                let record = self.draft.to_new_post(status, Utc::now());
                self.posts.create(&record).await
            }
            Target::Update { id, .. } => {
                let patch = self.draft.to_patch(status);
                self.posts.update(id, &patch).await.map(|()| id)
            }
        };
        in_flight.finish();

        match result {
            Ok(id) => {
                self.draft = Draft::new();
                self.state = SessionState::Redirected(Redirect::Dashboard);
                Ok(id)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to save post");
                self.errors.insert(Field::Submit, e.to_string());
                self.state = SessionState::Error;
                Err(SubmitError::Store(e))
            }
        }
    }

    fn touch(&mut self, field: Field) {
        self.errors.remove(field);
        if self.state == SessionState::Error {
            self.state = SessionState::Editing;
        }
    }
}
