//! CLI administration tool for affiliate-tracker.
//!
//! Mints and revokes API tokens, prints global tracking statistics and
//! checks database connectivity without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create an admin token
//! cargo run --bin admin -- token create --name "Ops" --role admin --actor-id 1
//!
//! # Create a token for affiliate 42
//! cargo run --bin admin -- token create --name "Affiliate 42" --role affiliate --actor-id 42
//!
//! # List all tokens
//! cargo run --bin admin -- token list
//!
//! # Revoke a token
//! cargo run --bin admin -- token revoke "Affiliate 42"
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
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `TOKEN_SIGNING_SECRET` (required for `token create`): must match the server

use affiliate_tracker::application::services::auth_service::hash_token;
use affiliate_tracker::domain::entities::Role;
use affiliate_tracker::domain::repositories::TokenRepository;
use affiliate_tracker::infrastructure::persistence::PgTokenRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing affiliate-tracker.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Show tracking and payout statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Create a new API token
    Create {
        /// Token name (e.g., "Ops", "Merchant 7")
        #[arg(short, long)]
        name: Option<String>,

        /// Role granted to the token: admin, merchant or affiliate
        #[arg(short, long, default_value = "affiliate")]
        role: String,

        /// Merchant or affiliate id the token acts as
        #[arg(short, long)]
        actor_id: i64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Revoke a token
    Revoke {
        /// Token name or ID to revoke
        name_or_id: String,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Token { action } => handle_token_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_token_action(action: TokenAction, pool: &PgPool) -> Result<()> {
    let repo = Arc::new(PgTokenRepository::new(Arc::new(pool.clone())));

    match action {
        TokenAction::Create {
            name,
            role,
            actor_id,
            yes,
        } => {
            let role: Role = role
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid role: {}", e))?;
            create_token(repo, name, role, actor_id, yes).await?;
        }
        TokenAction::List => list_tokens(repo).await?,
        TokenAction::Revoke { name_or_id } => revoke_token(repo, name_or_id).await?,
    }

    Ok(())
}

/// Creates a token and prints it once.
///
/// Only the HMAC digest keyed by `TOKEN_SIGNING_SECRET` is stored, so the
/// secret here must be the one the server runs with.
async fn create_token(
    repo: Arc<PgTokenRepository>,
    name: Option<String>,
    role: Role,
    actor_id: i64,
    skip_confirm: bool,
) -> Result<()> {
    let secret =
        std::env::var("TOKEN_SIGNING_SECRET").context("TOKEN_SIGNING_SECRET must be set")?;

    println!("{}", "Create API Token".bright_blue().bold());
    println!();

    let token_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text(format!("{} {}", role, actor_id))
            .interact_text()?,
    };

    let token_value = generate_token();

    println!("{}", "Token details:".bright_white().bold());
    println!("  Name:     {}", token_name.cyan());
    println!("  Role:     {}", role.as_str().cyan());
    println!("  Actor ID: {}", actor_id.to_string().cyan());
    println!("  Token:    {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "IMPORTANT: Save this token now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this token?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let token_hash = hash_token(&secret, &token_value);

    repo.create_token(&token_name, &token_hash, actor_id, role)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create token: {}", e))?;

    println!("{}", "Token created successfully!".green().bold());
    println!();
    println!(
        "  {}: Bearer {}",
        "Authorization".bright_cyan(),
        token_value.bright_yellow()
    );
    println!();

    Ok(())
}

async fn list_tokens(repo: Arc<PgTokenRepository>) -> Result<()> {
    println!("{}", "API Tokens".bright_blue().bold());
    println!();

    let tokens = repo
        .list_tokens()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tokens: {}", e))?;

    if tokens.is_empty() {
        println!("{}", "  No tokens found".yellow());
        return Ok(());
    }

    println!(
        "  {:<5} {:<28} {:<10} {:<8} {:<18} {:<10}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Role".bright_white().bold(),
        "Actor".bright_white().bold(),
        "Last used".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "-".repeat(85).bright_black());

    for token in &tokens {
        let status = if token.revoked_at.is_some() {
            "REVOKED".red()
        } else {
            "ACTIVE".green()
        };
        let last_used = token
            .last_used_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "  {:<5} {:<28} {:<10} {:<8} {:<18} {}",
            token.id.to_string().bright_black(),
            token.name.cyan(),
            token.role.as_str(),
            token.actor_id,
            last_used.bright_black(),
            status
        );
    }

    println!();
    println!("  Total: {}", tokens.len().to_string().bright_white().bold());

    Ok(())
}

/// Revokes a token looked up by numeric ID or exact name.
async fn revoke_token(repo: Arc<PgTokenRepository>, name_or_id: String) -> Result<()> {
    let token = match name_or_id.parse::<i64>() {
        Ok(id) => repo.find_by_id(id).await,
        Err(_) => repo.find_by_name(&name_or_id).await,
    }
    .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
    .context("Token not found")?;

    if token.revoked_at.is_some() {
        println!("{}", "This token is already revoked".yellow());
        return Ok(());
    }

    println!("  Token: {}", token.name.cyan());
    println!("  Role:  {} (actor {})", token.role.as_str(), token.actor_id);
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Revoke this token?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "Cancelled".red());
        return Ok(());
    }

    repo.revoke_token(token.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke token: {}", e))?;

    println!("{}", "Token revoked successfully!".green().bold());

    Ok(())
}

#[derive(sqlx::FromRow)]
struct GlobalStats {
    campaigns_active: i64,
    links: i64,
    clicks: i64,
    conversions_pending: i64,
    conversions_approved: i64,
    conversions_rejected: i64,
    commission_approved: Decimal,
    payouts_open: i64,
    paid_out: Decimal,
    tokens_active: i64,
}

async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let stats = sqlx::query_as::<_, GlobalStats>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM campaigns WHERE status = 'ACTIVE') AS campaigns_active,
            (SELECT COUNT(*) FROM affiliate_links) AS links,
            (SELECT COUNT(*) FROM clicks) AS clicks,
            (SELECT COUNT(*) FROM conversions WHERE status = 'PENDING') AS conversions_pending,
            (SELECT COUNT(*) FROM conversions WHERE status = 'APPROVED') AS conversions_approved,
            (SELECT COUNT(*) FROM conversions WHERE status = 'REJECTED') AS conversions_rejected,
            (SELECT COALESCE(SUM(commission), 0) FROM conversions WHERE status = 'APPROVED')
                AS commission_approved,
            (SELECT COUNT(*) FROM payment_requests WHERE status IN ('PENDING', 'PROCESSING'))
                AS payouts_open,
            (SELECT COALESCE(SUM(amount), 0) FROM payment_requests WHERE status = 'COMPLETED')
                AS paid_out,
            (SELECT COUNT(*) FROM api_tokens WHERE revoked_at IS NULL) AS tokens_active
        "#,
    )
    .fetch_one(pool)
    .await
    .context("Failed to load statistics")?;

    let rows = [
        ("Active campaigns", stats.campaigns_active.to_string()),
        ("Links", stats.links.to_string()),
        ("Clicks", stats.clicks.to_string()),
        ("Pending conversions", stats.conversions_pending.to_string()),
        ("Approved conversions", stats.conversions_approved.to_string()),
        ("Rejected conversions", stats.conversions_rejected.to_string()),
        ("Approved commission", stats.commission_approved.round_dp(2).to_string()),
        ("Open payment requests", stats.payouts_open.to_string()),
        ("Paid out", stats.paid_out.round_dp(2).to_string()),
        ("Active tokens", stats.tokens_active.to_string()),
    ];

    for (label, value) in rows {
        println!("  {:<24} {}", format!("{label}:"), value.bright_green().bold());
    }
    println!();

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;
            let migrations: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
                    .fetch_one(pool)
                    .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}

/// Generates a 48-character alphanumeric token.
fn generate_token() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    const TOKEN_LEN: usize = 48;

    let mut rng = rand::rng();

    (0..TOKEN_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}
