//! CLI administration tool for link-shortener.
//!
//! Manages user accounts, issues tokens and shows statistics directly
//! against PostgreSQL, without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # List users with their link counts
//! cargo run --bin admin -- user list
//!
//! # Delete a user and all of their links
//! cargo run --bin admin -- user delete alice
//!
//! # Issue a token for an existing user
//! cargo run --bin admin -- token issue alice
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `DATABASE_URL` (or `DB_*`), `JWT_SECRET`,
//! `JWT_EXPIRATION_HOURS`.

use link_shortener::application::services::TokenService;
use link_shortener::config::{self, Config};
use link_shortener::domain::repositories::UserRepository;
use link_shortener::infrastructure::persistence::PgUserRepository;
use link_shortener::server::connect_pool;
use link_shortener::utils::clock::SystemClock;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing link-shortener.
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
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Issue tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// List all users
    List,

    /// Delete a user together with all of their links
    Delete {
        /// Username to delete
        username: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Issue a bearer token for an existing user
    Issue {
        /// Username the token is issued for
        username: String,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[derive(sqlx::FromRow)]
struct UserSummary {
    id: i64,
    username: String,
    email: Option<String>,
    created_at: DateTime<Utc>,
    link_count: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    let pool = connect_pool(&config).await?;

    match cli.command {
        Commands::User { action } => handle_user_action(action, &pool).await?,
        Commands::Token { action } => handle_token_action(action, &pool, &config).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_user_action(action: UserAction, pool: &PgPool) -> Result<()> {
    match action {
        UserAction::List => list_users(pool).await,
        UserAction::Delete { username, yes } => {
            let repo = PgUserRepository::new(Arc::new(pool.clone()));
            delete_user(&repo, &username, yes).await
        }
    }
}

/// Lists users with the number of links each owns.
///
/// # Output Format
///
/// ```text
/// 👥 Users
///
///   ID   Username             Email                          Links  Created
///   ─────────────────────────────────────────────────────────────────────────────
///   1    alice                alice@example.com              3      2024-01-15 10:30
/// ```
async fn list_users(pool: &PgPool) -> Result<()> {
    println!("{}", "👥 Users".bright_blue().bold());
    println!();

    let users = sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT u.id, u.username, u.email, u.created_at, COUNT(l.id) AS link_count
        FROM users u
        LEFT JOIN links l ON l.user_id = u.id
        GROUP BY u.id
        ORDER BY u.id
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list users")?;

    if users.is_empty() {
        println!("{}", "  No users found".yellow());
        return Ok(());
    }

    println!(
        "  {:<4} {:<20} {:<30} {:<6} {}",
        "ID".bright_white().bold(),
        "Username".bright_white().bold(),
        "Email".bright_white().bold(),
        "Links".bright_white().bold(),
        "Created".bright_white().bold()
    );
    println!("  {}", "─".repeat(77).bright_black());

    for user in &users {
        println!(
            "  {:<4} {:<20} {:<30} {:<6} {}",
            user.id.to_string().bright_black(),
            user.username.cyan(),
            user.email.as_deref().unwrap_or("-"),
            user.link_count,
            user.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black()
        );
    }

    println!();
    println!("  Total: {}", users.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Deletes a user; their links go with them (`ON DELETE CASCADE`).
///
/// Asks for confirmation (default: No) unless `--yes` is given.
async fn delete_user(repo: &PgUserRepository, username: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑️  Delete User".bright_blue().bold());
    println!();

    let user = repo
        .find_by_username(username)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .with_context(|| format!("User '{username}' not found"))?;

    println!("  User: {}", user.username.cyan());
    println!("  ID:   {}", user.id.to_string().bright_black());
    println!();
    println!(
        "{}",
        "⚠️  All links owned by this user will be deleted too."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this user?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let deleted = repo
        .delete(user.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete user: {}", e))?;

    if deleted {
        println!("{}", "✅ User deleted".green().bold());
    } else {
        println!("{}", "⚠️  User was already gone".yellow());
    }
    println!();

    Ok(())
}

async fn handle_token_action(action: TokenAction, pool: &PgPool, config: &Config) -> Result<()> {
    match action {
        TokenAction::Issue { username } => {
            let repo = PgUserRepository::new(Arc::new(pool.clone()));
            issue_token(&repo, config, &username).await
        }
    }
}

/// Issues a token with the configured secret and lifetime.
///
/// Only for existing users; a token for an unknown name would pass
/// validation but fail every link operation.
async fn issue_token(repo: &PgUserRepository, config: &Config, username: &str) -> Result<()> {
    println!("{}", "🔑 Issue Token".bright_blue().bold());
    println!();

    repo.find_by_username(username)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .with_context(|| format!("User '{username}' not found"))?;

    let tokens = TokenService::new(
        &config.jwt_secret,
        config.token_lifetime(),
        Arc::new(SystemClock),
    )
    .context("Invalid token settings")?;

    let token = tokens.issue(username).context("Failed to sign token")?;

    if config.jwt_secret_is_default {
        println!(
            "{}",
            "⚠️  JWT_SECRET is not set; this token is signed with the development key".yellow()
        );
    }

    println!("  User:    {}", username.cyan());
    println!("  Expires: {}h", config.jwt_expiration_hours);
    println!("  Token:   {}", token.bright_yellow().bold());
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" {}/my-links",
        token.bright_yellow(),
        config.base_url
    );
    println!();

    Ok(())
}

/// Displays user, link and click totals.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let users_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(pool)
        .await?;

    let clicks_count: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(click_count), 0)::BIGINT FROM links")
        .fetch_one(pool)
        .await?;

    println!("  Users:  {}", users_count.to_string().bright_green().bold());
    println!("  Links:  {}", links_count.to_string().bright_green().bold());
    println!("  Clicks: {}", clicks_count.to_string().bright_green().bold());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let migrations: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM _sqlx_migrations WHERE success",
            )
            .fetch_one(pool)
            .await
            .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
