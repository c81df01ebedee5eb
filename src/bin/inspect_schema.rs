//! Utility to inspect the `swift_codes` table and print its structure.

use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::env;

/// Main entry point for the schema inspection utility.
///
/// Connects to the database and lists the columns and row counts of the
/// registry table.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let database_url = env::var("DATABASE_URL")
        .or_else(|_| env::var("DB_URL"))
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let pool = PgPoolOptions::new().connect(&database_url).await?;

    let columns: Vec<(String, String, String)> = sqlx::query_as(
        "SELECT column_name, data_type, is_nullable FROM information_schema.columns WHERE table_name = 'swift_codes' ORDER BY ordinal_position",
    )
    .fetch_all(&pool)
    .await?;

    if columns.is_empty() {
        println!("Table swift_codes not found");
        return Ok(());
    }

    println!("swift_codes:");
    for (col, type_, nullable) in columns {
        let null_marker = if nullable == "YES" { "null" } else { "not null" };
        println!("  - {}: {} ({})", col, type_, null_marker);
    }

    let (total, headquarters): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_headquarter) FROM swift_codes",
    )
    .fetch_one(&pool)
    .await?;
    println!();
    println!("{} rows, {} headquarters", total, headquarters);

    Ok(())
}
