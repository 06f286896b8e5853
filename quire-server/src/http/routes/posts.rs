//! Post pages: detail (with comments and view counting), create, update, delete

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};

use crate::auth::attach;
use crate::db::{
    CategoryRepo, CommentRepo, PostRepo, ReactionRepo, SessionRepo, Target, ViewRepo,
};
use crate::forms::{CommentForm, FormErrors, PostForm};
use crate::http::error::AppError;
use crate::http::extractors::{SignedIn, Viewer};
use crate::http::server::AppState;

/// Session key for view counting, plus a cookie to set if a new anonymous
/// session had to be started.
async fn ensure_session(
    state: &AppState,
    viewer: &Viewer,
) -> Result<(String, HeaderMap), AppError> {
    let mut headers = HeaderMap::new();
    if let Some(key) = &viewer.session_key {
        return Ok((key.clone(), headers));
    }

    let session = SessionRepo::new(&state.pool)
        .create(None, state.session.ttl())
        .await?;
    attach(&mut headers, state.session.issue(&session.session_key));
    Ok((session.session_key, headers))
}

/// Count the view and render the detail page with `form` and `errors`.
async fn render_detail(
    state: &AppState,
    viewer: &Viewer,
    id: i64,
    form: &CommentForm,
    errors: &FormErrors,
) -> Result<Response, AppError> {
    let mut post = PostRepo::new(&state.pool).get(id).await?;

    let (session_key, headers) = ensure_session(state, viewer).await?;
    if ViewRepo::new(&state.pool).record(id, &session_key).await? {
        post.views += 1;
    }

    let comments = CommentRepo::new(&state.pool).list_for_post(id).await?;
    let counts = ReactionRepo::new(&state.pool).counts(Target::post(id)).await?;
    let comments_likes_count: i64 = comments.iter().map(|c| c.likes).sum();
    let comments_dislikes_count: i64 = comments.iter().map(|c| c.dislikes).sum();

    let page = state
        .page(viewer)
        .await?
        .insert("can_edit", &viewer.can_edit(post.author_id))
        .insert("post", &post)
        .insert("comments", &comments)
        .insert("likes_count", &counts.likes)
        .insert("dislikes_count", &counts.dislikes)
        .insert("comments_likes_count", &comments_likes_count)
        .insert("comments_dislikes_count", &comments_dislikes_count)
        .insert("form", form)
        .insert("errors", errors);

    Ok((headers, state.render("post_detail.html", &page)?).into_response())
}

/// GET /post/{id}
async fn post_detail(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    render_detail(&state, &viewer, id, &CommentForm::default(), &FormErrors::default()).await
}

/// POST /post/{id} - add a comment, counting the visit like a detail view
async fn add_comment(
    State(state): State<Arc<AppState>>,
    signed_in: SignedIn,
    Path(id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Result<Response, AppError> {
    match form.validate() {
        Ok(content) => {
            CommentRepo::new(&state.pool)
                .create(id, signed_in.user.id, &content)
                .await?;
            let (session_key, headers) = ensure_session(&state, &signed_in.viewer).await?;
            ViewRepo::new(&state.pool).record(id, &session_key).await?;
            Ok((headers, Redirect::to(&format!("/post/{}", id))).into_response())
        }
        Err(errors) => render_detail(&state, &signed_in.viewer, id, &form, &errors).await,
    }
}

async fn render_form(
    state: &AppState,
    viewer: &Viewer,
    post_id: Option<i64>,
    form: &PostForm,
    errors: &FormErrors,
) -> Result<Response, AppError> {
    let page = state
        .page(viewer)
        .await?
        .insert("post_id", &post_id)
        .insert("form", form)
        .insert("errors", errors);
    Ok(state.render("post_form.html", &page)?.into_response())
}

/// GET /post/new
async fn new_post_form(
    State(state): State<Arc<AppState>>,
    signed_in: SignedIn,
) -> Result<Response, AppError> {
    render_form(&state, &signed_in.viewer, None, &PostForm::default(), &FormErrors::default()).await
}

/// POST /post/new
async fn create_post(
    State(state): State<Arc<AppState>>,
    signed_in: SignedIn,
    Form(form): Form<PostForm>,
) -> Result<Response, AppError> {
    let categories = CategoryRepo::new(&state.pool).list().await?;
    match form.validate(&categories) {
        Ok(draft) => {
            let id = PostRepo::new(&state.pool)
                .create(Some(signed_in.user.id), &draft)
                .await?;
            Ok(Redirect::to(&format!("/post/{}", id)).into_response())
        }
        Err(errors) => render_form(&state, &signed_in.viewer, None, &form, &errors).await,
    }
}

/// GET /post/{id}/update
async fn edit_post_form(
    State(state): State<Arc<AppState>>,
    signed_in: SignedIn,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let post = PostRepo::new(&state.pool).get(id).await?;
    if !signed_in.viewer.can_edit(post.author_id) {
        return Ok(Redirect::to("/login").into_response());
    }

    let form = PostForm::from_post(&post);
    render_form(&state, &signed_in.viewer, Some(id), &form, &FormErrors::default()).await
}

/// POST /post/{id}/update
async fn update_post(
    State(state): State<Arc<AppState>>,
    signed_in: SignedIn,
    Path(id): Path<i64>,
    Form(form): Form<PostForm>,
) -> Result<Response, AppError> {
    let repo = PostRepo::new(&state.pool);
    let post = repo.get(id).await?;
    if !signed_in.viewer.can_edit(post.author_id) {
        tracing::warn!(post_id = id, user = %signed_in.user.username, "update refused");
        return Ok(Redirect::to("/login").into_response());
    }

    let categories = CategoryRepo::new(&state.pool).list().await?;
    match form.validate(&categories) {
        Ok(draft) => {
            repo.update(id, &draft).await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(errors) => render_form(&state, &signed_in.viewer, Some(id), &form, &errors).await,
    }
}

/// GET /post/{id}/delete - confirmation page
async fn confirm_delete(
    State(state): State<Arc<AppState>>,
    signed_in: SignedIn,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let post = PostRepo::new(&state.pool).get(id).await?;
    if !signed_in.viewer.can_edit(post.author_id) {
        return Ok(Redirect::to("/login").into_response());
    }

    let page = state.page(&signed_in.viewer).await?.insert("post", &post);
    Ok(state.render("post_confirm_delete.html", &page)?.into_response())
}

/// POST /post/{id}/delete
async fn delete_post(
    State(state): State<Arc<AppState>>,
    signed_in: SignedIn,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let repo = PostRepo::new(&state.pool);
    let post = repo.get(id).await?;
    if !signed_in.viewer.can_edit(post.author_id) {
        tracing::warn!(post_id = id, user = %signed_in.user.username, "delete refused");
        return Ok(Redirect::to("/login").into_response());
    }

    repo.delete(id).await?;
    Ok(Redirect::to("/").into_response())
}

/// Post routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/post/new", get(new_post_form).post(create_post))
        .route("/post/{id}", get(post_detail).post(add_comment))
        .route("/post/{id}/update", get(edit_post_form).post(update_post))
        .route("/post/{id}/delete", get(confirm_delete).post(delete_post))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{LOCATION, SET_COOKIE};
    use axum::http::StatusCode;
    use sqlx::PgPool;

    use crate::db::{fixtures, MIGRATOR};
    use crate::http::routes::tests::{
        body_text, get, get_as, lazy_state, login_as, post_form, post_form_as, test_state,
    };

    #[tokio::test]
    async fn anonymous_new_post_goes_to_login() {
        let response = get(lazy_state(), "/post/new").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/login?next=/post/new");
    }

    #[tokio::test]
    async fn anonymous_comment_goes_to_login() {
        let response = post_form(lazy_state(), "/post/1", "content=hi").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/login");
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    #[ignore = "requires database"]
    async fn creating_post_redirects_to_it(pool: PgPool) {
        let category = fixtures::category(&pool, "General").await;
        let cookie = login_as(&pool, "ada", false).await;

        let body = format!("title=Hello&content=First+post&category={}", category);
        let response = post_form_as(test_state(pool.clone()), "/post/new", &body, &cookie).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers()[LOCATION].to_str().unwrap().to_owned();
        let id: i64 = location.trim_start_matches("/post/").parse().unwrap();
        let post = PostRepo::new(&pool).get(id).await.unwrap();
        assert_eq!(post.title, "Hello");
        assert_eq!(post.author_username.as_deref(), Some("ada"));
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    #[ignore = "requires database"]
    async fn invalid_post_rerenders_with_errors(pool: PgPool) {
        let cookie = login_as(&pool, "ada", false).await;
        let response =
            post_form_as(test_state(pool), "/post/new", "title=&content=x&category=77", &cookie)
                .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Title cannot be empty"));
        assert!(body.contains("Select a valid choice."));
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    #[ignore = "requires database"]
    async fn anonymous_view_starts_session_and_counts_once(pool: PgPool) {
        let id = fixtures::post(&pool, None, "Hello").await;
        let state = test_state(pool.clone());

        let first = get(state.clone(), &format!("/post/{}", id)).await;
        assert_eq!(first.status(), StatusCode::OK);
        let set_cookie = first.headers()[SET_COOKIE].to_str().unwrap().to_owned();
        let cookie = set_cookie.split(';').next().unwrap().to_owned();

        let again = get_as(state.clone(), &format!("/post/{}", id), &cookie).await;
        assert!(again.headers().get(SET_COOKIE).is_none());
        assert_eq!(PostRepo::new(&pool).get(id).await.unwrap().views, 1);

        get(state, &format!("/post/{}", id)).await;
        assert_eq!(PostRepo::new(&pool).get(id).await.unwrap().views, 2);
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    #[ignore = "requires database"]
    async fn comment_is_added(pool: PgPool) {
        let id = fixtures::post(&pool, None, "Hello").await;
        let cookie = login_as(&pool, "ada", false).await;

        let response =
            post_form_as(test_state(pool.clone()), &format!("/post/{}", id), "content=Nice+one", &cookie)
                .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], format!("/post/{}", id).as_str());

        let comments = CommentRepo::new(&pool).list_for_post(id).await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].content, "Nice one");
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    #[ignore = "requires database"]
    async fn commenting_counts_as_a_view(pool: PgPool) {
        let id = fixtures::post(&pool, None, "Hello").await;
        let cookie = login_as(&pool, "ada", false).await;
        let state = test_state(pool.clone());

        post_form_as(state.clone(), &format!("/post/{}", id), "content=First", &cookie).await;
        assert_eq!(PostRepo::new(&pool).get(id).await.unwrap().views, 1);

        // same session: the follow-up detail view is not a new one
        get_as(state, &format!("/post/{}", id), &cookie).await;
        assert_eq!(PostRepo::new(&pool).get(id).await.unwrap().views, 1);
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    #[ignore = "requires database"]
    async fn comment_with_nul_is_a_form_error(pool: PgPool) {
        let id = fixtures::post(&pool, None, "Hello").await;
        let cookie = login_as(&pool, "ada", false).await;

        let response =
            post_form_as(test_state(pool.clone()), &format!("/post/{}", id), "content=hi%00there", &cookie)
                .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Content: null characters are not allowed"));
        assert!(CommentRepo::new(&pool).list_for_post(id).await.unwrap().is_empty());
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    #[ignore = "requires database"]
    async fn non_author_cannot_update_or_delete(pool: PgPool) {
        let author = fixtures::user(&pool, "ada").await;
        let id = fixtures::post(&pool, Some(author.id), "Mine").await;
        let cookie = login_as(&pool, "mallory", false).await;
        let state = test_state(pool.clone());

        let response = get_as(state.clone(), &format!("/post/{}/update", id), &cookie).await;
        assert_eq!(response.headers()[LOCATION], "/login");

        let response =
            post_form_as(state, &format!("/post/{}/delete", id), "", &cookie).await;
        assert_eq!(response.headers()[LOCATION], "/login");
        assert!(PostRepo::new(&pool).get(id).await.is_ok());
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    #[ignore = "requires database"]
    async fn superuser_can_delete(pool: PgPool) {
        let id = fixtures::post(&pool, None, "Orphan").await;
        let cookie = login_as(&pool, "root", true).await;

        let response =
            post_form_as(test_state(pool.clone()), &format!("/post/{}/delete", id), "", &cookie)
                .await;
        assert_eq!(response.headers()[LOCATION], "/");
        assert!(PostRepo::new(&pool).get(id).await.is_err());
    }
}
