//! Operator script to purge old leads from the database.
//!
//! Usage: `purge_leads <older-than-days> [--dry-run]`
//!
//! Leads never expire on their own; this is an explicit administrator action.

use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::env;

/// Main entry point for the purge script.
///
/// Connects to the database and deletes leads created more than the given
/// number of days ago, in a single transaction.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let mut args = env::args().skip(1);
    let days: i32 = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("Usage: purge_leads <older-than-days> [--dry-run]"))?
        .parse()
        .map_err(|_| anyhow::anyhow!("older-than-days must be a whole number"))?;
    if days < 1 {
        anyhow::bail!("older-than-days must be at least 1");
    }
    let dry_run = args.any(|arg| arg == "--dry-run");

    let database_url = env::var("DATABASE_URL")
        .or_else(|_| env::var("DB_URL"))
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database. Looking for leads older than {} days...", days);

    if dry_run {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM leads WHERE created_at < NOW() - make_interval(days => $1)",
        )
        .bind(days)
        .fetch_one(&pool)
        .await?;

        tracing::info!("Dry run: {} lead(s) would be deleted.", count);
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM leads WHERE created_at < NOW() - make_interval(days => $1)")
        .bind(days)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!("Purge complete. Deleted {} lead(s).", result.rows_affected());

    Ok(())
}
