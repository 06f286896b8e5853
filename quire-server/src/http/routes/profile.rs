//! User profile page

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Html,
    routing::get,
    Router,
};
use chrono::Utc;
use quire_core::text::days_since;

use crate::db::{PostFilter, PostRepo, UserRepo};
use crate::http::error::AppError;
use crate::http::extractors::Viewer;
use crate::http::server::AppState;
use crate::models::{Pagination, PaginationParams};

/// GET /user/{username} - a user's posts and totals
async fn user_posts(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path(username): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Html<String>, AppError> {
    let profile = UserRepo::new(&state.pool).get_by_username(&username).await?;
    let posts = PostRepo::new(&state.pool);
    let listing = posts
        .list(
            &PostFilter::Author(profile.id),
            Pagination::from_params(&params, state.per_page),
        )
        .await?;
    let stats = posts.author_stats(profile.id).await?;

    let page = state
        .page(&viewer)
        .await?
        .insert("profile", &profile)
        .insert("posts", &listing.items)
        .insert("page", &listing.nav())
        .insert("total_posts", &stats.total_posts)
        .insert("total_views", &stats.total_views)
        .insert("total_comments", &stats.total_comments)
        .insert("registered_days", &days_since(profile.date_joined, Utc::now()));
    state.render("user_posts.html", &page)
}

/// Profile routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/user/{username}", get(user_posts))
}
