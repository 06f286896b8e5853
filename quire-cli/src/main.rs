//! quire CLI - run and administer the quire blog
//!
//! - `serve`: run the HTTP server (migrating first unless told not to)
//! - `migrate`: apply database migrations
//! - `user create`: add an account, optionally a superuser
//! - `category add` / `category list`: manage post categories

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quire_core::QuireConfig;

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "quire",
    author,
    version,
    about = "A small multi-user blog: posts, comments, likes and per-session view counts"
)]
struct Cli {
    /// Config file (default: ~/.quire/config.toml)
    #[arg(long, global = true, env = "QUIRE_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG still wins when set)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (needs the `telemetry` feature)
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(commands::serve::ServeArgs),
    /// Apply pending database migrations
    Migrate(commands::migrate::MigrateArgs),
    /// Manage user accounts
    User(commands::user::UserArgs),
    /// Manage post categories
    Category(commands::category::CategoryArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })
    .ok();

    let config = QuireConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let result = match cli.command {
        Commands::Serve(args) => commands::run_serve(args, config).await,
        Commands::Migrate(args) => commands::run_migrate(args, config).await,
        Commands::User(args) => commands::run_user(args, config).await,
        Commands::Category(args) => commands::run_category(args, config).await,
    };

    tracing_setup::shutdown_otel();
    result
}
