use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::models::{InsertOutcome, SwiftCode};

/// Errors surfaced by a [`SwiftCodeStore`].
///
/// `NotFound` means the query ran and nothing matched; `Storage` means the
/// backend itself failed.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no record found for {0}")]
    NotFound(String),
    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Persistence contract for the SWIFT code registry.
///
/// Implementations provide their own concurrency control; callers share a
/// single instance across requests.
#[async_trait]
pub trait SwiftCodeStore: Send + Sync {
    /// Stores `record` unless its code is already present (first write wins).
    async fn insert(&self, record: &SwiftCode) -> Result<InsertOutcome, StoreError>;

    async fn get_by_code(&self, code: &str) -> Result<SwiftCode, StoreError>;

    /// All records for `country_code`, ordered by code. Empty is not an error.
    async fn list_by_country(&self, country_code: &str) -> Result<Vec<SwiftCode>, StoreError>;

    async fn delete_by_code(&self, code: &str) -> Result<(), StoreError>;
}

/// Postgres-backed store over the `swift_codes` table.
#[derive(Clone)]
pub struct PgSwiftCodeStore {
    pool: PgPool,
}

impl PgSwiftCodeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SwiftCodeStore for PgSwiftCodeStore {
    async fn insert(&self, record: &SwiftCode) -> Result<InsertOutcome, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO swift_codes (swift_code, country_code, country_name, is_headquarter, headquarter_swift_code, address, bank_name)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (swift_code) DO NOTHING
            "#,
        )
        .bind(&record.swift_code)
        .bind(&record.country_code)
        .bind(&record.country_name)
        .bind(record.is_headquarter)
        .bind(&record.headquarter_code)
        .bind(&record.address)
        .bind(&record.bank_name)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::AlreadyExists)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    async fn get_by_code(&self, code: &str) -> Result<SwiftCode, StoreError> {
        sqlx::query_as::<_, SwiftCode>(
            r#"
            SELECT swift_code, country_code, country_name, is_headquarter, headquarter_swift_code, address, bank_name
            FROM swift_codes
            WHERE swift_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(code.to_string()))
    }

    async fn list_by_country(&self, country_code: &str) -> Result<Vec<SwiftCode>, StoreError> {
        let rows = sqlx::query_as::<_, SwiftCode>(
            r#"
            SELECT swift_code, country_code, country_name, is_headquarter, headquarter_swift_code, address, bank_name
            FROM swift_codes
            WHERE country_code = $1
            ORDER BY swift_code
            "#,
        )
        .bind(country_code)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn delete_by_code(&self, code: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM swift_codes WHERE swift_code = $1")
            .bind(code)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(code.to_string()));
        }
        Ok(())
    }
}

/// In-process store keyed by code, for tests and database-less runs.
#[derive(Debug, Default)]
pub struct InMemorySwiftCodeStore {
    records: RwLock<BTreeMap<String, SwiftCode>>,
}

impl InMemorySwiftCodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SwiftCodeStore for InMemorySwiftCodeStore {
    async fn insert(&self, record: &SwiftCode) -> Result<InsertOutcome, StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.swift_code) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        records.insert(record.swift_code.clone(), record.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn get_by_code(&self, code: &str) -> Result<SwiftCode, StoreError> {
        self.records
            .read()
            .await
            .get(code)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(code.to_string()))
    }

    async fn list_by_country(&self, country_code: &str) -> Result<Vec<SwiftCode>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.country_code == country_code)
            .cloned()
            .collect())
    }

    async fn delete_by_code(&self, code: &str) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .remove(code)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(code.to_string()))
    }
}
