//! Handler error type with IntoResponse
//!
//! Errors become HTML pages with matching status codes. Internal failures
//! are logged and shown without detail.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tera::Context;

use crate::auth::AuthError;
use crate::db::repos::DbError;
use crate::templates::TEMPLATES;

/// Handler error with automatic HTTP status mapping
#[derive(Debug)]
pub enum AppError {
    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Database error (500, logged)
    Database(DbError),

    /// Template rendering failed (500, logged)
    Template(tera::Error),

    /// Password hashing failed (500, logged)
    Auth(AuthError),
}

impl AppError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::NotFound { resource, .. } => (
                StatusCode::NOT_FOUND,
                format!("The requested {} does not exist.", resource),
            ),
            Self::Database(e) => {
                tracing::error!(error = %e, "database error");
                internal()
            }
            Self::Template(e) => {
                tracing::error!(error = ?e, "template error");
                internal()
            }
            Self::Auth(e) => {
                tracing::error!(error = %e, "auth error");
                internal()
            }
        }
    }
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Something went wrong on our side. Please try again later.".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        let mut context = Context::new();
        context.insert("status", &status.as_u16());
        context.insert("reason", status.canonical_reason().unwrap_or(""));
        context.insert("message", &message);

        match TEMPLATES.render("error.html", &context) {
            Ok(page) => (status, page).into_response(),
            Err(e) => {
                tracing::error!(error = ?e, "failed to render error page");
                (status, Html(format!("<h1>{}</h1>", status))).into_response()
            }
        }
    }
}

impl From<DbError> for AppError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            _ => Self::Database(e),
        }
    }
}

impl From<tera::Error> for AppError {
    fn from(e: tera::Error) -> Self {
        Self::Template(e)
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        Self::Auth(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn not_found_is_404_page() {
        let response = AppError::not_found("post", 7).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_of(response).await;
        assert!(body.contains("404 Not Found"));
        assert!(body.contains("The requested post does not exist."));
    }

    #[tokio::test]
    async fn db_not_found_maps_to_404() {
        let err: AppError = DbError::not_found("user", "ghost").into();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let err = AppError::Auth(AuthError::Hash("salt exploded".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body_of(response).await.contains("salt exploded"));
    }
}
