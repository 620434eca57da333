//! CLI administration tool for snaplink.
//!
//! Inspects stored links without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Totals across all links
//! cargo run --bin snaplink-admin -- stats
//!
//! # Show a single link
//! cargo run --bin snaplink-admin -- link Ab3x_Q
//!
//! # Check database connection
//! cargo run --bin snaplink-admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`, or the `DB_*` components (see `snaplink::config`)
//! - `CODE_LENGTH` (optional): expected code length for input checks

use snaplink::config::Config;
use snaplink::domain::repositories::LinkRepository;
use snaplink::infrastructure::persistence::PgLinkRepository;
use snaplink::utils::code_generator::{DEFAULT_CODE_LENGTH, is_valid_code};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for inspecting snaplink data.
#[derive(Parser)]
#[command(name = "snaplink-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Show totals across all links
    Stats,

    /// Show a single link
    Link {
        /// Short code to look up
        code: String,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = Config::load_database_url().context("Database is not configured")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    let repo = PgLinkRepository::new(Arc::new(pool.clone()));

    let result = match cli.command {
        Commands::Stats => handle_stats(&repo).await,
        Commands::Link { code } => handle_link(&repo, &code).await,
        Commands::Db { action } => match action {
            DbAction::Check => handle_db_check(&repo).await,
        },
    };

    pool.close().await;
    result
}

/// Displays link and click totals.
async fn handle_stats(repo: &PgLinkRepository) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let links = repo
        .count()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count links: {}", e))?;
    let clicks = repo
        .total_clicks()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to sum clicks: {}", e))?;

    println!("  Links:  {}", links.to_string().bright_white().bold());
    println!("  Clicks: {}", clicks.to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Prints one link record.
async fn handle_link(repo: &PgLinkRepository, code: &str) -> Result<()> {
    let expected_length = std::env::var("CODE_LENGTH")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_CODE_LENGTH);

    if !is_valid_code(code, expected_length) {
        println!(
            "{}",
            format!(
                "⚠️  '{}' does not look like a {}-character short code",
                code, expected_length
            )
            .yellow()
        );
    }

    let link = repo
        .find_by_code(code)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    let Some(link) = link else {
        println!("{}", "❌ URL not found".red());
        return Ok(());
    };

    println!("{}", "🔗 Link".bright_blue().bold());
    println!();
    println!("  Code:    {}", link.short_code.cyan());
    println!("  URL:     {}", link.original_url);
    println!("  Clicks:  {}", link.clicks.to_string().bright_white().bold());
    println!(
        "  Created: {}",
        link.created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
    println!();

    Ok(())
}

/// Verifies the database answers queries.
async fn handle_db_check(repo: &PgLinkRepository) -> Result<()> {
    match repo.ping().await {
        Ok(()) => {
            println!("{}", "✅ Database connection OK".green().bold());
            Ok(())
        }
        Err(e) => {
            println!("{}", "❌ Database check failed".red().bold());
            Err(anyhow::anyhow!("{}", e))
        }
    }
}
