//! `quire category` - manage the categories posts are filed under

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use quire_core::QuireConfig;
use quire_server::db::CategoryRepo;
use quire_server::models::CategoryTitle;

#[derive(Args, Debug)]
pub struct CategoryArgs {
    #[command(subcommand)]
    pub command: CategoryCommands,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// Add a category
    Add {
        /// Category title (unique)
        title: String,
    },
    /// List categories
    List,
}

pub async fn run_category(args: CategoryArgs, config: QuireConfig) -> Result<()> {
    match args.command {
        CategoryCommands::Add { title } => {
            let title = CategoryTitle::new(&title).context("Invalid category title")?;
            let pool = super::connect(&config).await?;
            let category = CategoryRepo::new(&pool)
                .create(&title)
                .await
                .context("Failed to create category")?;
            println!("Added category {} (id {})", category.title, category.id);
        }
        CategoryCommands::List => {
            let pool = super::connect(&config).await?;
            let categories = CategoryRepo::new(&pool)
                .list()
                .await
                .context("Failed to list categories")?;
            if categories.is_empty() {
                println!("No categories yet");
            }
            for category in categories {
                println!("{:>4}  {}", category.id, category.title);
            }
        }
    }
    Ok(())
}
