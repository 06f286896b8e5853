//! Login, registration and logout

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;

use crate::auth::{attach, hash_password, verify_password};
use crate::db::{DbError, SessionRepo, UserRepo};
use crate::forms::{safe_next, FormErrors, LoginForm, RegistrationForm, LOGIN_FAILED, USERNAME_TAKEN};
use crate::http::error::AppError;
use crate::http::extractors::Viewer;
use crate::http::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct NextParam {
    pub next: Option<String>,
}

async fn render_login(
    state: &AppState,
    viewer: &Viewer,
    form: &LoginForm,
    errors: &FormErrors,
) -> Result<Response, AppError> {
    let page = state
        .page(viewer)
        .await?
        .insert("form", form)
        .insert("errors", errors);
    Ok(state.render("login.html", &page)?.into_response())
}

/// GET /login
async fn login_form(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Query(params): Query<NextParam>,
) -> Result<Response, AppError> {
    let form = LoginForm {
        next: params.next,
        ..LoginForm::default()
    };
    render_login(&state, &viewer, &form, &FormErrors::default()).await
}

/// POST /login
async fn login(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let user = UserRepo::new(&state.pool)
        .find_by_username(form.username.trim())
        .await?
        .filter(|user| verify_password(&form.password, &user.password_hash));

    let Some(user) = user else {
        tracing::info!(username = %form.username.trim(), "login failed");
        let mut errors = FormErrors::default();
        errors.add_general(LOGIN_FAILED);
        return render_login(&state, &viewer, &form, &errors).await;
    };

    let sessions = SessionRepo::new(&state.pool);
    if let Some(old) = &viewer.session_key {
        sessions.delete(old).await?;
    }
    let session = sessions.create(Some(user.id), state.session.ttl()).await?;
    tracing::info!(user = %user.username, "logged in");

    let mut headers = HeaderMap::new();
    attach(&mut headers, state.session.issue(&session.session_key));
    Ok((headers, Redirect::to(safe_next(form.next.as_deref()))).into_response())
}

async fn render_registration(
    state: &AppState,
    viewer: &Viewer,
    form: &RegistrationForm,
    errors: &FormErrors,
) -> Result<Response, AppError> {
    let page = state
        .page(viewer)
        .await?
        .insert("form", form)
        .insert("errors", errors);
    Ok(state.render("registration.html", &page)?.into_response())
}

/// GET /register
async fn registration_form(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
) -> Result<Response, AppError> {
    render_registration(&state, &viewer, &RegistrationForm::default(), &FormErrors::default())
        .await
}

/// POST /register
async fn register(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Form(form): Form<RegistrationForm>,
) -> Result<Response, AppError> {
    let (username, password) = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => return render_registration(&state, &viewer, &form, &errors).await,
    };

    let users = UserRepo::new(&state.pool);
    if users.exists(username.as_str()).await? {
        let mut errors = FormErrors::default();
        errors.add("username", USERNAME_TAKEN);
        return render_registration(&state, &viewer, &form, &errors).await;
    }

    let hash = hash_password(&password)?;
    match users.create(&username, &hash, false).await {
        Ok(user) => {
            tracing::info!(user = %user.username, "registered");
            Ok(Redirect::to("/login").into_response())
        }
        Err(DbError::Conflict { .. }) => {
            let mut errors = FormErrors::default();
            errors.add("username", USERNAME_TAKEN);
            render_registration(&state, &viewer, &form, &errors).await
        }
        Err(e) => Err(e.into()),
    }
}

/// GET or POST /logout
async fn logout(State(state): State<Arc<AppState>>, viewer: Viewer) -> Result<Response, AppError> {
    if let Some(key) = &viewer.session_key {
        SessionRepo::new(&state.pool).delete(key).await?;
    }
    if let Some(user) = &viewer.user {
        tracing::info!(user = %user.username, "logged out");
    }

    let mut headers = HeaderMap::new();
    attach(&mut headers, state.session.clear());
    Ok((headers, Redirect::to("/")).into_response())
}

/// Authentication routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login_form).post(login))
        .route("/register", get(registration_form).post(register))
        .route("/logout", get(logout).post(logout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{LOCATION, SET_COOKIE};
    use axum::http::StatusCode;
    use sqlx::PgPool;

    use crate::db::MIGRATOR;
    use crate::http::routes::tests::{
        body_text, get_as, lazy_state, login_as, post_form, test_state,
    };

    #[tokio::test]
    async fn anonymous_logout_clears_cookie() {
        let response = post_form(lazy_state(), "/logout", "").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/");
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    #[ignore = "requires database"]
    async fn register_then_login(pool: PgPool) {
        let state = test_state(pool);

        let response = post_form(
            state.clone(),
            "/register",
            "username=ada&password1=analytical+engine&password2=analytical+engine",
        )
        .await;
        assert_eq!(response.headers()[LOCATION], "/login");

        let response = post_form(
            state.clone(),
            "/login",
            "username=ada&password=analytical+engine&next=%2Fpost%2Fnew",
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/post/new");
        assert!(response.headers()[SET_COOKIE]
            .to_str()
            .unwrap()
            .contains("HttpOnly"));
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    #[ignore = "requires database"]
    async fn bad_password_rerenders_with_error(pool: PgPool) {
        let state = test_state(pool);
        post_form(
            state.clone(),
            "/register",
            "username=ada&password1=analytical+engine&password2=analytical+engine",
        )
        .await;

        let response = post_form(state, "/login", "username=ada&password=wrong").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(LOGIN_FAILED));
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    #[ignore = "requires database"]
    async fn nul_in_username_fails_login(pool: PgPool) {
        let response = post_form(test_state(pool), "/login", "username=a%00b&password=whatever").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(LOGIN_FAILED));
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    #[ignore = "requires database"]
    async fn duplicate_registration_is_a_form_error(pool: PgPool) {
        let state = test_state(pool.clone());
        login_as(&pool, "ada", false).await;

        let response = post_form(
            state,
            "/register",
            "username=ada&password1=analytical+engine&password2=analytical+engine",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(USERNAME_TAKEN));
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    #[ignore = "requires database"]
    async fn logout_ends_session(pool: PgPool) {
        let cookie = login_as(&pool, "ada", false).await;
        let key = cookie.split('=').nth(1).unwrap().to_owned();

        let response = get_as(test_state(pool.clone()), "/logout", &cookie).await;
        assert_eq!(response.headers()[LOCATION], "/");
        assert!(SessionRepo::new(&pool).load(&key).await.unwrap().is_none());
    }
}
