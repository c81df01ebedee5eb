//! Loads a SWIFT code data file into the configured database without
//! starting the server.
//!
//! Usage: `load_swift_codes [path]` (defaults to `SWIFT_DATA_PATH`).

use anyhow::Result;
use std::path::PathBuf;

use swift_codes_api::config::Config;
use swift_codes_api::db::Database;
use swift_codes_api::db_storage::PgSwiftCodeStore;
use swift_codes_api::ingestion;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("=== Import SWIFT codes to Database ===\n");

    let config = Config::from_env()?;
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.data_path.clone());

    println!("Connecting to database...");
    let db = Database::connect(&config.database_url, config.max_connections).await?;
    db.ensure_schema().await?;
    println!("✓ Database connected\n");

    let records = ingestion::open_swift_codes(&path)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
    let store = PgSwiftCodeStore::new(db.pool.clone());
    let report = ingestion::seed_store(&store, records).await;

    println!("\n=== Import Summary ===");
    println!("Inserted:   {}", report.inserted);
    println!("Duplicates: {}", report.duplicates);
    println!("Skipped:    {}", report.skipped);
    println!("Failed:     {}", report.failed);

    Ok(())
}
