//! CLI administration tool for quicklink-redirect.
//!
//! Converts between short keys and identifiers, inspects stored links and
//! checks database connectivity without going through the HTTP server.
//!
//! # Usage
//!
//! ```bash
//! # Identifier -> short key
//! cargo run --bin admin -- key encode 125
//!
//! # Short key -> identifier
//! cargo run --bin admin -- key decode 21
//!
//! # Show the destination and hit count behind a key
//! cargo run --bin admin -- link show 21
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_*` components: required by `link` and `db`

use quicklink_redirect::config::Config;
use quicklink_redirect::domain::key_codec;
use quicklink_redirect::domain::repositories::LinkRepository;
use quicklink_redirect::infrastructure::persistence::PgLinkRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing quicklink-redirect.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Convert between short keys and identifiers
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Inspect stored links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Print the short key for an identifier
    Encode {
        /// Non-negative link identifier
        id: i64,
    },

    /// Print the identifier behind a short key
    Decode {
        /// Base-62 short key
        key: String,
    },
}

#[derive(Subcommand)]
enum LinkAction {
    /// Show the destination and hit count behind a short key
    Show {
        /// Base-62 short key
        key: String,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Key { action } => handle_key_action(action)?,
        Commands::Link { action } => handle_link_action(action, &connect().await?).await?,
        Commands::Db { action } => handle_db_action(action, &connect().await?).await?,
    }

    Ok(())
}

async fn connect() -> Result<PgPool> {
    let database_url = Config::load_database_url()?;

    PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")
}

fn handle_key_action(action: KeyAction) -> Result<()> {
    match action {
        KeyAction::Encode { id } => {
            let key = key_codec::encode(id)?;
            println!("{}", key.bright_green().bold());
        }
        KeyAction::Decode { key } => {
            let id = key_codec::decode(&key)?;
            println!("{}", id.to_string().bright_green().bold());

            let canonical = key_codec::encode(id)?;
            if canonical != key {
                println!(
                    "{}",
                    format!("note: canonical form is {}", canonical).yellow()
                );
            }
        }
    }

    Ok(())
}

async fn handle_link_action(action: LinkAction, pool: &PgPool) -> Result<()> {
    match action {
        LinkAction::Show { key } => {
            let id = key_codec::decode(&key)?;
            let repo = PgLinkRepository::new(Arc::new(pool.clone()));

            let Some(link) = repo.find_by_id(id).await? else {
                println!("{}", format!("No link stored for key {}", key).red().bold());
                return Ok(());
            };

            let hits: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM hit_records WHERE url_record_id = $1")
                    .bind(link.id)
                    .fetch_one(pool)
                    .await?;

            println!("{}", "Link".bright_blue().bold());
            println!();
            println!("  Key:         {}", key_codec::encode(link.id)?.bright_white());
            println!("  ID:          {}", link.id.to_string().bright_white());
            println!("  Destination: {}", link.destination.bright_white());
            println!("  Hits:        {}", hits.to_string().bright_green().bold());
            println!();
        }
    }

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM url_records")
                .fetch_one(pool)
                .await
                .context("url_records table missing; start the server once to migrate")?;

            println!("{}", "Database connection OK".green().bold());
            println!("  Links stored: {}", links.to_string().bright_white());
        }
    }

    Ok(())
}
