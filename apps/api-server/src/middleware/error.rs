//! Error handling - RFC 7807 compliant responses.

use std::collections::BTreeMap;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use nexiler_core::authoring::{ImageError, SubmitError};
use nexiler_core::dashboard::DashboardError;
use nexiler_core::error::{Field, FieldErrors, StoreError};
use nexiler_core::ports::AuthError;
use nexiler_shared::ErrorResponse;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Field name to message.
    #[error("Validation errors: {0:?}")]
    Validation(BTreeMap<String, String>),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(BTreeMap::from([(field.into(), message.into())]))
    }

    pub fn unauthenticated() -> Self {
        AppError::Unauthorized("Authentication required".to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Store(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Unauthorized(detail) => ErrorResponse::unauthorized().with_detail(detail),
            AppError::Conflict(detail) => ErrorResponse::new(409, "Conflict").with_detail(detail),
            AppError::Validation(errors) => errors
                .iter()
                .fold(ErrorResponse::validation_failed(), |resp, (field, message)| {
                    resp.with_field_error(field, message)
                }),
            // The store's own message is what the author sees in the banner.
            AppError::Store(detail) => ErrorResponse::new(502, "Store Error").with_detail(detail),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Validation(
            errors
                .iter()
                .map(|(field, message)| (field.to_string(), message.to_string()))
                .collect(),
        )
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => AppError::NotFound(err.to_string()),
            StoreError::InvalidField(_) | StoreError::InvalidRecord(_) => {
                AppError::Internal(err.to_string())
            }
            StoreError::Connection(_) | StoreError::Query(_) => {
                tracing::error!(error = %err, "Document store failure");
                AppError::Store(err.to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::TokenExpired
            | AuthError::InvalidToken(_)
            | AuthError::MissingAuth => AppError::Unauthorized(err.to_string()),
            AuthError::HashingError(_) | AuthError::Provider(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Validation(errors) => errors.into(),
            SubmitError::InvalidTransition { .. } => AppError::Conflict(err.to_string()),
            SubmitError::Unauthenticated | SubmitError::NotEditing => AppError::unauthenticated(),
            SubmitError::InFlight => AppError::Conflict(err.to_string()),
            SubmitError::Store(e) => e.into(),
        }
    }
}

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::EmptyTitle => AppError::field(Field::Title.as_str(), err.to_string()),
            DashboardError::UnknownPost(_) => AppError::NotFound(err.to_string()),
            DashboardError::NotEditing | DashboardError::Saving => {
                AppError::Conflict(err.to_string())
            }
            DashboardError::Unauthenticated => AppError::unauthenticated(),
            DashboardError::Store(e) => e.into(),
            DashboardError::Auth(e) => e.into(),
        }
    }
}

impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        AppError::field(Field::Image.as_str(), err.to_string())
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use uuid::Uuid;

    use super::*;

    #[actix_rt::test]
    async fn test_field_errors_become_problem_details() {
        let mut errors = FieldErrors::new();
        errors.insert(Field::Title, "Title is required");
        errors.insert(Field::Content, "Content is required");

        let resp = AppError::from(SubmitError::Validation(errors)).error_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["errors"]["title"], "Title is required");
        assert_eq!(json["errors"]["content"], "Content is required");
    }

    #[test]
    fn test_store_errors() {
        let missing = StoreError::NotFound {
            collection: "blogs".to_string(),
            id: Uuid::nil(),
        };
        assert_eq!(AppError::from(missing).status_code(), StatusCode::NOT_FOUND);

        let down = StoreError::Connection("refused".to_string());
        assert_eq!(AppError::from(down).status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_invalid_credentials_are_unauthorized() {
        let err = AppError::from(AuthError::InvalidCredentials);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}
