use sqlx::{postgres::PgPoolOptions, PgPool};

const CREATE_SWIFT_CODES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS swift_codes (
        swift_code VARCHAR(11) PRIMARY KEY,
        country_code CHAR(2) NOT NULL,
        country_name VARCHAR(100) NOT NULL,
        is_headquarter BOOLEAN NOT NULL,
        headquarter_swift_code VARCHAR(11),
        address VARCHAR(255),
        bank_name VARCHAR(255)
    )
"#;

const CREATE_COUNTRY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS swift_codes_country_code_idx ON swift_codes (country_code)";

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Creates the `swift_codes` table and its country index if missing.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(CREATE_SWIFT_CODES_TABLE)
            .execute(&self.pool)
            .await?;
        sqlx::query(CREATE_COUNTRY_INDEX).execute(&self.pool).await?;
        tracing::debug!("swift_codes schema ensured");
        Ok(())
    }
}
