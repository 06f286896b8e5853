//! `quire migrate` - bring the schema up to date

use anyhow::{Context, Result};
use clap::Parser;
use quire_core::QuireConfig;

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL (overrides config/environment)
    #[arg(long)]
    pub database_url: Option<String>,
}

pub async fn run_migrate(args: MigrateArgs, mut config: QuireConfig) -> Result<()> {
    if let Some(url) = args.database_url {
        config.database.url = url;
    }

    let pool = super::connect(&config).await?;
    quire_server::migrate(&pool)
        .await
        .context("Failed to apply migrations")?;
    println!("Database is up to date");
    Ok(())
}
