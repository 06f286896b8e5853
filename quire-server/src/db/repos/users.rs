//! User repository
//!
//! Accounts are created by registration or `quire user create`; the password
//! arrives already hashed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::DbError;
use crate::models::Username;

/// User record from database
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
}

/// User repository
pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user. Duplicate usernames yield `DbError::Conflict`.
    pub async fn create(
        &self,
        username: &Username,
        password_hash: &str,
        is_superuser: bool,
    ) -> Result<User, DbError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, is_superuser)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, is_superuser, date_joined
            "#,
        )
        .bind(username.as_str())
        .bind(password_hash)
        .bind(is_superuser)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::from_unique(e, "user", username.as_str()))
    }

    /// Look up a user by exact username.
    ///
    /// Names Postgres cannot store (containing NUL) match nobody.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        if username.contains('\0') {
            return Ok(None);
        }
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, is_superuser, date_joined
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by username or `NotFound`.
    pub async fn get_by_username(&self, username: &str) -> Result<User, DbError> {
        self.find_by_username(username)
            .await?
            .ok_or_else(|| DbError::not_found("user", username))
    }

    /// Whether a username is already taken.
    pub async fn exists(&self, username: &str) -> Result<bool, DbError> {
        if username.contains('\0') {
            return Ok(false);
        }
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MIGRATOR;

    #[sqlx::test(migrator = "MIGRATOR")]
    #[ignore = "requires database"]
    async fn duplicate_username_conflicts(pool: PgPool) {
        let repo = UserRepo::new(&pool);
        let name = Username::new("ada").unwrap();

        let user = repo.create(&name, "hash", false).await.unwrap();
        assert_eq!(user.username, "ada");
        assert!(!user.is_superuser);

        let err = repo.create(&name, "hash", true).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { resource: "user", .. }));
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    #[ignore = "requires database"]
    async fn lookup_by_username(pool: PgPool) {
        let repo = UserRepo::new(&pool);
        repo.create(&Username::new("grace").unwrap(), "hash", true)
            .await
            .unwrap();

        assert!(repo.exists("grace").await.unwrap());
        assert!(repo.get_by_username("grace").await.unwrap().is_superuser);
        assert!(matches!(
            repo.get_by_username("nobody").await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    #[ignore = "requires database"]
    async fn nul_in_username_matches_nobody(pool: PgPool) {
        let repo = UserRepo::new(&pool);
        assert!(repo.find_by_username("a\0b").await.unwrap().is_none());
        assert!(!repo.exists("a\0b").await.unwrap());
    }
}
