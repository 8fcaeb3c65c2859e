//! Authentication handlers.

use std::collections::BTreeMap;

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{HttpResponse, web};

use nexiler_core::Redirect;
use nexiler_core::domain::mask_email;
use nexiler_core::ports::AuthProvider;
use nexiler_shared::ApiResponse;
use nexiler_shared::dto::{LoginRequest, SessionResponse, UserResponse};

use crate::middleware::auth::{AUTH_COOKIE, Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const PASSWORD_MIN_CHARS: usize = 6;

/// `local@domain.tld` with no whitespace.
fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(name, tld)| !name.is_empty() && !tld.is_empty())
                && !domain.ends_with('.')
        }
        None => false,
    }
}

fn validate_login(req: &LoginRequest) -> AppResult<()> {
    let mut errors = BTreeMap::new();
    if req.email.trim().is_empty() {
        errors.insert("email".to_string(), "Email is required".to_string());
    } else if !looks_like_email(req.email.trim()) {
        errors.insert("email".to_string(), "Please enter a valid email".to_string());
    }
    if req.password.is_empty() {
        errors.insert("password".to_string(), "Password is required".to_string());
    } else if req.password.chars().count() < PASSWORD_MIN_CHARS {
        errors.insert(
            "password".to_string(),
            "Password must be at least 6 characters".to_string(),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

fn session_cookie(token: String, max_age_seconds: i64, secure: bool) -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE, token)
        .path("/")
        .max_age(Duration::seconds(max_age_seconds))
        .secure(secure)
        .same_site(SameSite::Strict)
        .finish()
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validate_login(&req)?;

    let session = state.auth_provider();
    let user = session.sign_in(req.email.trim(), &req.password).await?;
    let expires_in = session.token_lifetime_seconds();

    tracing::debug!(user_email = %mask_email(&user.email), "Issuing session cookie");

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(user.token.clone(), expires_in, state.cookie_secure))
        .json(SessionResponse {
            user: UserResponse {
                id: user.id.to_string(),
                email: user.email,
            },
            access_token: user.token,
            token_type: "Bearer".to_string(),
            expires_in: expires_in.max(0) as u64,
            redirect: redirect_name(Redirect::Dashboard),
        }))
}

/// POST /api/auth/logout
pub async fn logout(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    if let Some(identity) = identity.0 {
        identity.session.sign_out().await?;
    }

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(String::new(), 0, state.cookie_secure))
        .json(ApiResponse::ok_with_message(
            redirect_name(Redirect::Login),
            "Signed out",
        )))
}

/// GET /api/auth/me - Protected route
pub async fn me(identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(UserResponse {
        id: identity.user.id.to_string(),
        email: identity.user.email,
    }))
}

pub(crate) fn redirect_name(redirect: Redirect) -> String {
    match redirect {
        Redirect::Login => "login",
        Redirect::Dashboard => "dashboard",
    }
    .to_string()
}
