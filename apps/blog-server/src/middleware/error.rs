//! Error handling middleware - RFC 7807 compliant responses.

use std::collections::BTreeMap;

use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header};
use blogicum_core::error::{DomainError, RepoError};
use blogicum_core::policy::Redirect;
use blogicum_shared::ErrorResponse;
use thiserror::Error;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Validation errors: {0:?}")]
    Validation(BTreeMap<String, Vec<String>>),

    /// Soft denial: the client is sent elsewhere instead of shown an error.
    #[error("Redirect to {0}")]
    Redirect(String),
}

impl AppError {
    /// Turn an authorization denial into a redirect.
    ///
    /// `next` is the path the viewer tried to reach; the login flow sends
    /// them back there afterwards.
    pub fn redirect(redirect: Redirect, next: &str) -> Self {
        match redirect {
            Redirect::Login => AppError::Redirect(format!("/auth/login/?next={next}")),
            Redirect::PostDetail { post_id } => AppError::Redirect(format!("/posts/{post_id}/")),
        }
    }

    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.into(), vec![message.into()]);
        AppError::Validation(errors)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Redirect(_) => StatusCode::FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::Redirect(location) => {
                return HttpResponse::Found()
                    .insert_header((header::LOCATION, location.as_str()))
                    .finish();
            }
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Unauthorized => ErrorResponse::unauthorized(),
            AppError::Conflict(detail) => ErrorResponse::new(409, "Conflict").with_detail(detail),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
            AppError::Validation(errors) => ErrorResponse::validation(errors.clone()),
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, .. } => {
                AppError::NotFound(format!("{entity_type} not found"))
            }
            DomainError::Validation(fields) => {
                let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
                for field in fields {
                    errors.entry(field.field).or_default().push(field.message);
                }
                AppError::Validation(errors)
            }
            DomainError::Duplicate(msg) => AppError::Conflict(msg),
            DomainError::Unauthorized => AppError::Unauthorized,
            DomainError::Internal(msg) => AppError::Internal(msg),
            DomainError::Repository(err) => err.into(),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::Conflict(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(field_messages(&err))
    }
}

/// Flatten validator output into field → messages.
pub fn field_messages(err: &validator::ValidationErrors) -> BTreeMap<String, Vec<String>> {
    err.field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use blogicum_core::error::FieldError;
    use uuid::Uuid;

    #[test]
    fn test_login_redirect_keeps_next_path() {
        let post_id = Uuid::new_v4();
        let path = format!("/posts/{post_id}/edit/");
        let err = AppError::redirect(Redirect::Login, &path);

        assert_eq!(err.status_code(), StatusCode::FOUND);
        let response = err.error_response();
        let location = response.headers().get(header::LOCATION).unwrap();
        assert_eq!(location.to_str().unwrap(), format!("/auth/login/?next={path}"));
    }

    #[test]
    fn test_post_detail_redirect() {
        let post_id = Uuid::new_v4();
        let err = AppError::redirect(Redirect::PostDetail { post_id }, "/ignored");

        match err {
            AppError::Redirect(location) => assert_eq!(location, format!("/posts/{post_id}/")),
            other => panic!("expected redirect, got {other:?}"),
        }
    }

    #[test]
    fn test_domain_validation_groups_fields() {
        let err = AppError::from(DomainError::Validation(vec![
            FieldError::new("title", "required"),
            FieldError::new("title", "too long"),
            FieldError::new("category_id", "unknown"),
        ]));

        match err {
            AppError::Validation(errors) => {
                assert_eq!(errors["title"], vec!["required", "too long"]);
                assert_eq!(errors["category_id"], vec!["unknown"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_hidden_entity_reads_as_not_found() {
        let err = AppError::from(DomainError::not_found("Post", Uuid::new_v4()));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
