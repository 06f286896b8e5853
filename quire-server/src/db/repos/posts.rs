//! Post repository
//!
//! Handles post CRUD with:
//! - Atomic creation together with the post's like/dislike sets
//! - Paginated, filtered listing in one query (window count for totals)
//! - Per-author totals for the profile page

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use super::reactions::{ensure_sets, Target};
use super::DbError;
use crate::models::{Paginated, Pagination, PostContent, PostTitle};

/// Full post with category and author names, for the detail page
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category_id: i64,
    pub category_title: String,
    pub author_id: Option<i64>,
    pub author_username: Option<String>,
    pub views: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Post as shown in listings
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category_id: i64,
    pub category_title: String,
    pub author_username: Option<String>,
    pub views: i32,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Validated fields for creating or updating a post
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: PostTitle,
    pub content: PostContent,
    pub category_id: i64,
}

/// Which posts a listing shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Category(i64),
    Author(i64),
    /// Case-insensitive POSIX regex over title or content
    Matching(String),
}

/// Totals shown on a user's profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AuthorStats {
    pub total_posts: i64,
    pub total_views: i64,
    pub total_comments: i64,
}

const POST_COLUMNS: &str = r#"
    SELECT
        p.id, p.title, p.content, p.category_id, c.title AS category_title,
        p.author_id, u.username AS author_username, p.views,
        p.created_at, p.updated_at
    FROM posts p
    JOIN categories c ON c.id = p.category_id
    LEFT JOIN users u ON u.id = p.author_id
"#;

fn post_from_row(r: &PgRow) -> Post {
    Post {
        id: r.get("id"),
        title: r.get("title"),
        content: r.get("content"),
        category_id: r.get("category_id"),
        category_title: r.get("category_title"),
        author_id: r.get("author_id"),
        author_username: r.get("author_username"),
        views: r.get("views"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

/// Post repository
pub struct PostRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> PostRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a post and its vote sets in one transaction, returning its id.
    pub async fn create(&self, author_id: Option<i64>, post: &NewPost) -> Result<i64, DbError> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO posts (title, content, category_id, author_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(post.title.as_str())
        .bind(post.content.as_str())
        .bind(post.category_id)
        .bind(author_id)
        .fetch_one(&mut *tx)
        .await?;

        ensure_sets(&mut tx, Target::post(id)).await?;

        tx.commit().await?;
        tracing::info!(post_id = id, ?author_id, "post created");
        Ok(id)
    }

    /// Get a single post by id.
    pub async fn get(&self, id: i64) -> Result<Post, DbError> {
        let sql = format!("{POST_COLUMNS} WHERE p.id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("post", id))?;

        Ok(post_from_row(&row))
    }

    /// Replace title, content and category.
    pub async fn update(&self, id: i64, post: &NewPost) -> Result<(), DbError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = $2, content = $3, category_id = $4, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(post.title.as_str())
        .bind(post.content.as_str())
        .bind(post.category_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("post", id));
        }
        tracing::info!(post_id = id, "post updated");
        Ok(())
    }

    /// Delete a post; comments, views and vote sets cascade.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("post", id));
        }
        tracing::info!(post_id = id, "post deleted");
        Ok(())
    }

    /// Newest-first listing with comment counts.
    pub async fn list(
        &self,
        filter: &PostFilter,
        page: Pagination,
    ) -> Result<Paginated<PostSummary>, DbError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT
                p.id, p.title, p.content, p.category_id, c.title AS category_title,
                u.username AS author_username, p.views, p.created_at,
                (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count,
                COUNT(*) OVER() AS total
            FROM posts p
            JOIN categories c ON c.id = p.category_id
            LEFT JOIN users u ON u.id = p.author_id
            "#,
        );

        match filter {
            PostFilter::All => {}
            PostFilter::Category(id) => {
                qb.push(" WHERE p.category_id = ").push_bind(*id);
            }
            PostFilter::Author(id) => {
                qb.push(" WHERE p.author_id = ").push_bind(*id);
            }
            PostFilter::Matching(pattern) => {
                qb.push(" WHERE p.title ~* ")
                    .push_bind(pattern.clone())
                    .push(" OR p.content ~* ")
                    .push_bind(pattern.clone());
            }
        }

        qb.push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = qb.build().fetch_all(self.pool).await?;

        let total = rows.first().map(|r| r.get::<i64, _>("total")).unwrap_or(0);
        let items = rows
            .into_iter()
            .map(|r| PostSummary {
                id: r.get("id"),
                title: r.get("title"),
                content: r.get("content"),
                category_id: r.get("category_id"),
                category_title: r.get("category_title"),
                author_username: r.get("author_username"),
                views: r.get("views"),
                comment_count: r.get("comment_count"),
                created_at: r.get("created_at"),
            })
            .collect();

        Ok(Paginated::new(items, total, page))
    }

    /// Search titles and contents. A blank query lists everything; a pattern
    /// Postgres rejects is retried as a literal string. NUL characters are
    /// dropped, since no stored text can contain them.
    pub async fn search(
        &self,
        query: &str,
        page: Pagination,
    ) -> Result<Paginated<PostSummary>, DbError> {
        let query = query.replace('\0', "");
        let query = query.trim();
        if query.is_empty() {
            return self.list(&PostFilter::All, page).await;
        }

        match self.list(&PostFilter::Matching(query.to_owned()), page).await {
            Err(e) if e.is_invalid_regex() => {
                tracing::debug!(query, "invalid search regex, matching literally");
                self.list(&PostFilter::Matching(regex::escape(query)), page)
                    .await
            }
            other => other,
        }
    }

    /// Post count, view sum and comment count across an author's posts.
    pub async fn author_stats(&self, author_id: i64) -> Result<AuthorStats, DbError> {
        let (total_posts, total_views, total_comments): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM posts WHERE author_id = $1),
                (SELECT COALESCE(SUM(views), 0)::BIGINT FROM posts WHERE author_id = $1),
                (SELECT COUNT(*) FROM comments cm JOIN posts p ON p.id = cm.post_id
                 WHERE p.author_id = $1)
            "#,
        )
        .bind(author_id)
        .fetch_one(self.pool)
        .await?;

        Ok(AuthorStats {
            total_posts,
            total_views,
            total_comments,
        })
    }
}
