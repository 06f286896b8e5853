//! Listing pages: home, search, category, plus the static contact page

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Html,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::db::{CategoryRepo, PostFilter, PostRepo, PostSummary};
use crate::http::error::AppError;
use crate::http::extractors::Viewer;
use crate::http::server::AppState;
use crate::models::{Paginated, Pagination, PaginationParams};
use crate::templates::Page;

/// Query string for `/search`
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl SearchParams {
    fn pagination(&self, default_per_page: u32) -> Pagination {
        let params = PaginationParams {
            page: self.page,
            per_page: self.per_page,
        };
        Pagination::from_params(&params, default_per_page)
    }
}

fn listing(page: Page, posts: &Paginated<PostSummary>, heading: &str) -> Page {
    page.insert("posts", &posts.items)
        .insert("page", &posts.nav())
        .insert("heading", heading)
}

/// GET / - every post, newest first
async fn index(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Query(params): Query<PaginationParams>,
) -> Result<Html<String>, AppError> {
    let posts = PostRepo::new(&state.pool)
        .list(&PostFilter::All, Pagination::from_params(&params, state.per_page))
        .await?;

    let page = listing(state.page(&viewer).await?, &posts, "");
    state.render("index.html", &page)
}

/// GET /search?q= - regex search over titles and contents
async fn search(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>, AppError> {
    let query = params.q.as_deref().unwrap_or("");
    let posts = PostRepo::new(&state.pool)
        .search(query, params.pagination(state.per_page))
        .await?;
    tracing::debug!(query, hits = posts.total, "search");

    let heading = if query.trim().is_empty() {
        String::new()
    } else {
        format!("Results for \"{}\"", query.trim())
    };
    let page = listing(state.page(&viewer).await?, &posts, &heading).insert("query", query);
    state.render("index.html", &page)
}

/// GET /category/{id} - posts in one category
async fn category_posts(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path(id): Path<i64>,
    Query(params): Query<PaginationParams>,
) -> Result<Html<String>, AppError> {
    let category = CategoryRepo::new(&state.pool).get(id).await?;
    let posts = PostRepo::new(&state.pool)
        .list(
            &PostFilter::Category(category.id),
            Pagination::from_params(&params, state.per_page),
        )
        .await?;

    let page = listing(state.page(&viewer).await?, &posts, &category.title);
    state.render("index.html", &page)
}

/// GET /contact
async fn contact(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
) -> Result<Html<String>, AppError> {
    let page = state.page(&viewer).await?;
    state.render("contact.html", &page)
}

/// Listing routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/search", get(search))
        .route("/category/{id}", get(category_posts))
        .route("/contact", get(contact))
}
