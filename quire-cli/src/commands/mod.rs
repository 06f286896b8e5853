//! Command implementations for the quire CLI

pub mod category;
pub mod migrate;
pub mod serve;
pub mod user;

pub use category::run_category;
pub use migrate::run_migrate;
pub use serve::run_serve;
pub use user::run_user;

use anyhow::{Context, Result};
use quire_core::QuireConfig;
use sqlx::PgPool;

/// Connect using the configured URL and pool size.
pub(crate) async fn connect(config: &QuireConfig) -> Result<PgPool> {
    quire_server::create_pool_with_options(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to create database pool")
}
