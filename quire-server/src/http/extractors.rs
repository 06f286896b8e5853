//! Custom Axum extractors

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::Method;
use axum::response::{IntoResponse, Redirect, Response};

use super::error::AppError;
use super::server::AppState;
use crate::db::{SessionRepo, SessionUser};

/// Whoever is making the request: a live session key (if the cookie named
/// one) and the user logged in on it.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub session_key: Option<String>,
    pub user: Option<SessionUser>,
}

impl Viewer {
    /// Whether the viewer may edit or delete a post by `author_id`.
    pub fn can_edit(&self, author_id: Option<i64>) -> bool {
        match &self.user {
            Some(user) => user.is_superuser || author_id == Some(user.id),
            None => false,
        }
    }
}

impl FromRequestParts<Arc<AppState>> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(key) = state.session.read_key(&parts.headers) else {
            return Ok(Self::default());
        };

        match SessionRepo::new(&state.pool).load(&key).await? {
            Some((session, user)) => Ok(Self {
                session_key: Some(session.session_key),
                user,
            }),
            None => {
                tracing::debug!("stale session cookie ignored");
                Ok(Self::default())
            }
        }
    }
}

/// A logged-in user. Anonymous requests are sent to the login page.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub viewer: Viewer,
    pub user: SessionUser,
}

impl FromRequestParts<Arc<AppState>> for SignedIn {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let viewer = Viewer::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match viewer.user.clone() {
            Some(user) => Ok(Self { viewer, user }),
            None => Err(login_redirect(&parts.method, parts.uri.path()).into_response()),
        }
    }
}

/// Login URL for an anonymous request. GETs come back to where they were.
pub fn login_redirect(method: &Method, path: &str) -> Redirect {
    if method == Method::GET {
        Redirect::to(&format!("/login?next={}", path))
    } else {
        Redirect::to("/login")
    }
}
