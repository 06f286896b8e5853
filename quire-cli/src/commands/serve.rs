//! `quire serve` - run the blog over HTTP

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use quire_core::QuireConfig;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default from config: 127.0.0.1:8000)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Database URL (overrides config/environment)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Skip applying migrations at startup
    #[arg(long)]
    pub no_migrate: bool,
}

/// Run the HTTP server until ctrl-c / SIGTERM
pub async fn run_serve(args: ServeArgs, mut config: QuireConfig) -> Result<()> {
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(url) = args.database_url {
        config.database.url = url;
    }
    config.server.cors_permissive |= args.cors_permissive;

    tracing::info!(bind = %config.server.bind, "starting quire");

    let pool = super::connect(&config).await?;
    if !args.no_migrate {
        quire_server::migrate(&pool)
            .await
            .context("Failed to apply migrations")?;
    }

    quire_server::run_server(pool, &config)
        .await
        .context("Server error")?;
    Ok(())
}
