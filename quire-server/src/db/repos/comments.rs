//! Comment repository

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::reactions::{ensure_sets, Target};
use super::DbError;
use crate::models::CommentContent;

/// Comment record from database
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: Option<i64>,
    pub author_id: Option<i64>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Comment with author name and vote totals, for the post page
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommentWithVotes {
    pub id: i64,
    pub content: String,
    pub author_username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub likes: i64,
    pub dislikes: i64,
}

/// Comment repository
pub struct CommentRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CommentRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add a comment and its vote sets in one transaction.
    pub async fn create(
        &self,
        post_id: i64,
        author_id: i64,
        content: &CommentContent,
    ) -> Result<Comment, DbError> {
        let mut tx = self.pool.begin().await?;

        let post_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
                .bind(post_id)
                .fetch_one(&mut *tx)
                .await?;
        if !post_exists {
            return Err(DbError::not_found("post", post_id));
        }

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, author_id, content, created_at
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(content.as_str())
        .fetch_one(&mut *tx)
        .await?;

        ensure_sets(&mut tx, Target::comment(comment.id)).await?;

        tx.commit().await?;
        tracing::info!(post_id, comment_id = comment.id, author_id, "comment added");
        Ok(comment)
    }

    /// Get a single comment by id.
    pub async fn get(&self, id: i64) -> Result<Comment, DbError> {
        sqlx::query_as::<_, Comment>(
            "SELECT id, post_id, author_id, content, created_at FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("comment", id))
    }

    /// Comments on a post, oldest first, with like/dislike totals.
    pub async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentWithVotes>, DbError> {
        let comments = sqlx::query_as::<_, CommentWithVotes>(
            r#"
            SELECT
                cm.id,
                cm.content,
                u.username AS author_username,
                cm.created_at,
                (SELECT COUNT(*) FROM like_users m JOIN likes s ON s.id = m.set_id
                 WHERE s.comment_id = cm.id) AS likes,
                (SELECT COUNT(*) FROM dislike_users m JOIN dislikes s ON s.id = m.set_id
                 WHERE s.comment_id = cm.id) AS dislikes
            FROM comments cm
            LEFT JOIN users u ON u.id = cm.author_id
            WHERE cm.post_id = $1
            ORDER BY cm.created_at ASC, cm.id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(self.pool)
        .await?;

        Ok(comments)
    }
}
