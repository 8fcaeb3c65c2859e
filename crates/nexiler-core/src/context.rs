//! Explicit session context handed to each admin view.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::ports::{AuthProvider, AuthUser, Subscription};

/// Where the front end should navigate next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Redirect {
    /// The sign-in surface.
    Login,
    /// The post list.
    Dashboard,
}

/// Current-user signal for one view, kept fresh by an auth-state listener.
///
/// Dropping the context releases the listener.
pub struct SessionContext {
    user: Arc<Mutex<Option<AuthUser>>>,
    _subscription: Subscription,
}

impl SessionContext {
    /// Register with the provider. The provider reports the current state
    /// during registration, so the result is settled when this returns.
    pub fn observe(auth: &dyn AuthProvider) -> Self {
        let user = Arc::new(Mutex::new(None));
        let slot = user.clone();
        let subscription = auth.on_auth_state_changed(Box::new(move |next| {
            *slot.lock().unwrap_or_else(PoisonError::into_inner) = next;
        }));

        Self {
            user,
            _subscription: subscription,
        }
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    /// The signed-in user, or a redirect to the login surface.
    pub fn require(&self) -> Result<AuthUser, Redirect> {
        self.user().ok_or(Redirect::Login)
    }
}
