//! Per-session post view counting
//!
//! A `(post, session)` pair is recorded once; the post's counter moves only
//! when that insert actually happened, inside the same transaction.

use sqlx::PgPool;

use super::DbError;

/// View repository
pub struct ViewRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ViewRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a view of `post_id` by `session_key`.
    ///
    /// Returns `true` when this was the session's first view and the counter
    /// was incremented.
    pub async fn record(&self, post_id: i64, session_key: &str) -> Result<bool, DbError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO post_views (post_id, session_key)
            VALUES ($1, $2)
            ON CONFLICT (post_id, session_key) DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(session_key)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;

        if inserted {
            sqlx::query("UPDATE posts SET views = views + 1 WHERE id = $1")
                .bind(post_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        if inserted {
            tracing::debug!(post_id, "view counted");
        }
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{fixtures, PostRepo, MIGRATOR};

    #[sqlx::test(migrator = "MIGRATOR")]
    #[ignore = "requires database"]
    async fn same_session_counts_once(pool: PgPool) {
        let post = fixtures::post(&pool, None, "Hello").await;
        let views = ViewRepo::new(&pool);

        assert!(views.record(post, "session-a").await.unwrap());
        assert!(!views.record(post, "session-a").await.unwrap());
        assert_eq!(PostRepo::new(&pool).get(post).await.unwrap().views, 1);

        assert!(views.record(post, "session-b").await.unwrap());
        assert_eq!(PostRepo::new(&pool).get(post).await.unwrap().views, 2);
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    #[ignore = "requires database"]
    async fn concurrent_views_from_one_session_count_once(pool: PgPool) {
        let post = fixtures::post(&pool, None, "Busy").await;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = pool.clone();
                tokio::spawn(async move { ViewRepo::new(&pool).record(post, "same").await.unwrap() })
            })
            .collect();

        let mut counted = 0;
        for handle in handles {
            if handle.await.expect("task panicked") {
                counted += 1;
            }
        }

        assert_eq!(counted, 1);
        assert_eq!(PostRepo::new(&pool).get(post).await.unwrap().views, 1);
    }
}
