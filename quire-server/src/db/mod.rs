//! Database layer - connection pool, migrations and repositories
//!
//! # Design Principles
//!
//! - Connection pool, repositories borrow it
//! - Listings use JOINs and window counts, no N+1 queries
//! - Rely on DB constraints and ON CONFLICT, no check-then-insert
//! - Transactions for multi-step writes (post + vote sets, view + counter)

pub mod pool;
pub mod repos;

#[cfg(test)]
pub(crate) mod fixtures;

pub use pool::create_pool_with_options;
pub use repos::*;

use sqlx::PgPool;

/// Versioned schema migrations from the workspace `migrations/` directory
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../migrations");

/// Apply pending migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), DbError> {
    tracing::info!("Running database migrations...");
    MIGRATOR.run(pool).await?;
    tracing::info!("Database schema is up to date");
    Ok(())
}
