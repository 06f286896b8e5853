//! Route handlers organized by resource

use std::sync::Arc;

use axum::Router;

use super::server::AppState;

pub mod auth;
pub mod health;
pub mod home;
pub mod posts;
pub mod profile;
pub mod votes;

/// Every route the site serves
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::router())
        .merge(home::router())
        .merge(posts::router())
        .merge(auth::router())
        .merge(profile::router())
        .merge(votes::router())
}

#[cfg(test)]
pub(crate) mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::header::{CONTENT_TYPE, COOKIE};
    use axum::http::{Method, Request};
    use axum::response::Response;
    use quire_core::QuireConfig;
    use sqlx::postgres::PgPoolOptions;
    use sqlx::PgPool;
    use tower::ServiceExt;

    use crate::db::{SessionRepo, UserRepo};
    use crate::http::server::{build_router, AppState, ServerConfig};
    use crate::models::Username;

    /// State over a pool that never connects, for routes that stop before
    /// touching the database.
    pub fn lazy_state() -> AppState {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/quire")
            .expect("lazy pool");
        test_state(pool)
    }

    pub fn test_state(pool: PgPool) -> AppState {
        AppState::new(pool, &QuireConfig::default())
    }

    async fn send(state: AppState, request: Request<Body>) -> Response {
        build_router(state, &ServerConfig::default())
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    fn request(method: Method, uri: &str, cookie: Option<&str>, body: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_owned())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request")
    }

    pub async fn get(state: AppState, uri: &str) -> Response {
        send(state, request(Method::GET, uri, None, None)).await
    }

    pub async fn get_as(state: AppState, uri: &str, cookie: &str) -> Response {
        send(state, request(Method::GET, uri, Some(cookie), None)).await
    }

    pub async fn post_form(state: AppState, uri: &str, body: &str) -> Response {
        send(state, request(Method::POST, uri, None, Some(body))).await
    }

    pub async fn post_form_as(state: AppState, uri: &str, body: &str, cookie: &str) -> Response {
        send(state, request(Method::POST, uri, Some(cookie), Some(body))).await
    }

    pub async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        String::from_utf8(bytes.to_vec()).expect("utf-8 body")
    }

    /// Create a user with a live session and return the `Cookie` header value.
    pub async fn login_as(pool: &PgPool, username: &str, is_superuser: bool) -> String {
        let user = UserRepo::new(pool)
            .create(&Username::new(username).unwrap(), "not-a-real-hash", is_superuser)
            .await
            .expect("test user");
        let session = SessionRepo::new(pool)
            .create(Some(user.id), chrono::Duration::hours(1))
            .await
            .expect("test session");
        format!(
            "{}={}",
            QuireConfig::default().session.cookie_name,
            session.session_key
        )
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let response = get(lazy_state(), "/nowhere").await;
        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
    }
}
