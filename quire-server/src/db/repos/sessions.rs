//! Session repository
//!
//! A session is a random key stored in a cookie. Anonymous sessions exist
//! too: post views are deduplicated per session whether or not anyone is
//! logged in.

use chrono::{DateTime, Duration, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::DbError;

/// Session record from database
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub session_key: String,
    pub user_id: Option<i64>,
    pub expires_at: DateTime<Utc>,
}

/// The logged-in user attached to a session
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
    pub is_superuser: bool,
}

/// Session repository
pub struct SessionRepo<'a> {
    pool: &'a PgPool,
}

/// Fresh session key: 32 lowercase hex characters
pub fn new_session_key() -> String {
    Uuid::new_v4().simple().to_string()
}

impl<'a> SessionRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Start a session, optionally bound to a user.
    pub async fn create(&self, user_id: Option<i64>, ttl: Duration) -> Result<Session, DbError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (session_key, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING session_key, user_id, expires_at
            "#,
        )
        .bind(new_session_key())
        .bind(user_id)
        .bind(Utc::now() + ttl)
        .fetch_one(self.pool)
        .await?;

        Ok(session)
    }

    /// Load a live session and its user, if any. Expired keys return `None`.
    pub async fn load(
        &self,
        key: &str,
    ) -> Result<Option<(Session, Option<SessionUser>)>, DbError> {
        let row: Option<(String, Option<i64>, DateTime<Utc>, Option<String>, Option<bool>)> =
            sqlx::query_as(
                r#"
                SELECT s.session_key, s.user_id, s.expires_at, u.username, u.is_superuser
                FROM sessions s
                LEFT JOIN users u ON u.id = s.user_id
                WHERE s.session_key = $1 AND s.expires_at > NOW()
                "#,
            )
            .bind(key)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(|(session_key, user_id, expires_at, username, is_superuser)| {
            let user = match (user_id, username) {
                (Some(id), Some(username)) => Some(SessionUser {
                    id,
                    username,
                    is_superuser: is_superuser.unwrap_or(false),
                }),
                _ => None,
            };
            (
                Session {
                    session_key,
                    user_id,
                    expires_at,
                },
                user,
            )
        }))
    }

    /// Remove a session (logout).
    pub async fn delete(&self, key: &str) -> Result<(), DbError> {
        sqlx::query("DELETE FROM sessions WHERE session_key = $1")
            .bind(key)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Drop expired sessions, returning how many were removed.
    pub async fn purge_expired(&self) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{UserRepo, MIGRATOR};
    use crate::models::Username;

    #[test]
    fn keys_are_32_hex_chars() {
        let key = new_session_key();
        assert_eq!(key.len(), 32);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(key, new_session_key());
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    #[ignore = "requires database"]
    async fn session_carries_user(pool: PgPool) {
        let user = UserRepo::new(&pool)
            .create(&Username::new("ada").unwrap(), "hash", false)
            .await
            .unwrap();
        let repo = SessionRepo::new(&pool);

        let session = repo.create(Some(user.id), Duration::hours(1)).await.unwrap();
        let (loaded, who) = repo.load(&session.session_key).await.unwrap().unwrap();
        assert_eq!(loaded.user_id, Some(user.id));
        assert_eq!(who.unwrap().username, "ada");

        repo.delete(&session.session_key).await.unwrap();
        assert!(repo.load(&session.session_key).await.unwrap().is_none());
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    #[ignore = "requires database"]
    async fn expired_sessions_are_invisible(pool: PgPool) {
        let repo = SessionRepo::new(&pool);
        let session = repo.create(None, Duration::seconds(-5)).await.unwrap();

        assert!(repo.load(&session.session_key).await.unwrap().is_none());
        assert_eq!(repo.purge_expired().await.unwrap(), 1);
    }
}
