//! Category repository

use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::DbError;
use crate::models::CategoryTitle;

/// Category record from database
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Category {
    pub id: i64,
    pub title: String,
}

/// Category repository
pub struct CategoryRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a category; an existing title yields `DbError::Conflict`.
    pub async fn create(&self, title: &CategoryTitle) -> Result<Category, DbError> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (title) VALUES ($1) RETURNING id, title",
        )
        .bind(title.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::from_unique(e, "category", title.as_str()))
    }

    /// All categories, alphabetical (navigation and the post form).
    pub async fn list(&self) -> Result<Vec<Category>, DbError> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, title FROM categories ORDER BY title")
                .fetch_all(self.pool)
                .await?;
        Ok(categories)
    }

    /// Get a single category by id.
    pub async fn get(&self, id: i64) -> Result<Category, DbError> {
        sqlx::query_as::<_, Category>("SELECT id, title FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("category", id))
    }
}
