//! Repository implementations for database access
//!
//! Each repository borrows the pool and follows these patterns:
//! - Uses JOINs for list operations (no N+1)
//! - Handles conflicts via ON CONFLICT or unique-violation mapping
//! - Uses transactions for multi-step operations

pub mod users;
pub mod sessions;
pub mod categories;
pub mod posts;
pub mod comments;
pub mod reactions;
pub mod views;

pub use users::{User, UserRepo};
pub use sessions::{Session, SessionRepo, SessionUser};
pub use categories::{Category, CategoryRepo};
pub use posts::{AuthorStats, NewPost, Post, PostFilter, PostRepo, PostSummary};
pub use comments::{Comment, CommentRepo, CommentWithVotes};
pub use reactions::{ReactionRepo, Target, VoteCounts};
pub use views::ViewRepo;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("already exists: {resource} '{id}'")]
    Conflict { resource: &'static str, id: String },
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Postgres rejected a `~*` pattern (SQLSTATE 2201B).
    pub fn is_invalid_regex(&self) -> bool {
        match self {
            Self::Sqlx(err) => err
                .as_database_error()
                .and_then(|db| db.code())
                .map(|code| code == "2201B")
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Turn a unique-constraint violation into `Conflict`, pass anything
    /// else through.
    pub(crate) fn from_unique(err: sqlx::Error, resource: &'static str, id: &str) -> Self {
        let unique = err
            .as_database_error()
            .map(|db| db.is_unique_violation())
            .unwrap_or(false);

        if unique {
            Self::Conflict {
                resource,
                id: id.to_owned(),
            }
        } else {
            Self::Sqlx(err)
        }
    }
}
