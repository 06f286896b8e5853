//! `quire user` - account administration

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use quire_core::QuireConfig;
use quire_server::auth::hash_password;
use quire_server::db::UserRepo;
use quire_server::models::{NewPassword, Username};

#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommands,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create an account
    Create(CreateUserArgs),
}

#[derive(Args, Debug)]
pub struct CreateUserArgs {
    /// Login name (letters, digits and @.+-_)
    pub username: String,

    /// Password for the new account
    #[arg(long, env = "QUIRE_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Grant edit/delete rights over every post
    #[arg(long)]
    pub superuser: bool,
}

pub async fn run_user(args: UserArgs, config: QuireConfig) -> Result<()> {
    match args.command {
        UserCommands::Create(args) => create_user(args, &config).await,
    }
}

async fn create_user(args: CreateUserArgs, config: &QuireConfig) -> Result<()> {
    // validate before touching the database
    let username = Username::new(&args.username).context("Invalid username")?;
    let password = NewPassword::new(&args.password, &args.password).context("Invalid password")?;
    let hash = hash_password(&password).context("Failed to hash password")?;

    let pool = super::connect(config).await?;
    let user = UserRepo::new(&pool)
        .create(&username, &hash, args.superuser)
        .await
        .with_context(|| format!("Failed to create user {}", username.as_str()))?;

    tracing::info!(user_id = user.id, superuser = user.is_superuser, "user created");
    println!(
        "Created {}user {} (id {})",
        if user.is_superuser { "super" } else { "" },
        user.username,
        user.id
    );
    Ok(())
}
