//! Reference data loading for the SWIFT code registry.
//!
//! The data file is read once at startup in a single forward pass. Branches
//! are linked to the most recent headquarters seen with the same 8-character
//! prefix, so a branch that appears before its headquarters in the file stays
//! unlinked.

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::db_storage::SwiftCodeStore;
use crate::models::{is_headquarter_code, linkage_prefix, non_blank, CodeError, InsertOutcome, SwiftCode};

const COUNTRY_CODE_COLUMN: usize = 0;
const SWIFT_CODE_COLUMN: usize = 1;
const BANK_NAME_COLUMN: usize = 3;
const ADDRESS_COLUMN: usize = 4;
const COUNTRY_NAME_COLUMN: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to open data file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed row: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: missing column {column}")]
    MissingColumn { line: u64, column: usize },
    #[error("line {line}: {source}")]
    InvalidCode { line: u64, source: CodeError },
}

/// One data row, upper-cased, before headquarters linkage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSwiftRow {
    pub country_code: String,
    pub swift_code: String,
    pub bank_name: Option<String>,
    pub address: Option<String>,
    pub country_name: String,
}

impl RawSwiftRow {
    pub fn from_record(record: &StringRecord, line: u64) -> Result<Self, IngestError> {
        let column = |index: usize| {
            record
                .get(index)
                .map(|value| value.trim().to_uppercase())
                .ok_or(IngestError::MissingColumn { line, column: index })
        };

        Ok(Self {
            country_code: column(COUNTRY_CODE_COLUMN)?,
            swift_code: column(SWIFT_CODE_COLUMN)?,
            bank_name: non_blank(Some(column(BANK_NAME_COLUMN)?)),
            address: non_blank(Some(column(ADDRESS_COLUMN)?)),
            country_name: column(COUNTRY_NAME_COLUMN)?,
        })
    }
}

/// Tracks headquarters seen so far in one ingestion pass.
#[derive(Debug, Default)]
pub struct HeadquarterLinker {
    headquarters: HashMap<String, String>,
}

impl HeadquarterLinker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns a row into a record, linking branches to an already seen headquarters.
    pub fn link(&mut self, row: RawSwiftRow) -> Result<SwiftCode, CodeError> {
        let prefix = linkage_prefix(&row.swift_code)?.to_string();
        let is_headquarter = is_headquarter_code(&row.swift_code);

        let headquarter_code = if is_headquarter {
            self.headquarters.insert(prefix, row.swift_code.clone());
            None
        } else {
            self.headquarters.get(&prefix).cloned()
        };

        Ok(SwiftCode {
            swift_code: row.swift_code,
            country_code: row.country_code,
            country_name: row.country_name,
            is_headquarter,
            headquarter_code,
            address: row.address,
            bank_name: row.bank_name,
        })
    }
}

/// Lazy sequence of linked records read from a delimited source.
///
/// Each item is either a record or the error for that single row; a bad row
/// never ends the sequence.
pub struct SwiftCodeRecords<R> {
    records: StringRecordsIntoIter<R>,
    linker: HeadquarterLinker,
}

impl<R: Read> Iterator for SwiftCodeRecords<R> {
    type Item = Result<SwiftCode, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(IngestError::Csv(e))),
        };
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        Some(
            RawSwiftRow::from_record(&record, line).and_then(|row| {
                self.linker
                    .link(row)
                    .map_err(|source| IngestError::InvalidCode { line, source })
            }),
        )
    }
}

/// Reads records from `reader`, skipping the header row.
pub fn read_swift_codes<R: Read>(reader: R) -> SwiftCodeRecords<R> {
    let records = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader)
        .into_records();

    SwiftCodeRecords {
        records,
        linker: HeadquarterLinker::new(),
    }
}

pub fn open_swift_codes(path: &Path) -> Result<SwiftCodeRecords<File>, IngestError> {
    let file = File::open(path)?;
    Ok(read_swift_codes(file))
}

/// Counters for one ingestion pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    pub inserted: usize,
    pub duplicates: usize,
    /// Rows that could not be parsed.
    pub skipped: usize,
    /// Rows the store refused.
    pub failed: usize,
}

/// Writes every parsed record to `store`, logging and counting failures.
pub async fn seed_store<I>(store: &dyn SwiftCodeStore, records: I) -> IngestReport
where
    I: IntoIterator<Item = Result<SwiftCode, IngestError>>,
{
    let mut report = IngestReport::default();

    for item in records {
        let record = match item {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Skipping data row: {}", e);
                report.skipped += 1;
                continue;
            }
        };

        match store.insert(&record).await {
            Ok(InsertOutcome::Inserted) => report.inserted += 1,
            Ok(InsertOutcome::AlreadyExists) => {
                tracing::debug!("SWIFT code {} already stored", record.swift_code);
                report.duplicates += 1;
            }
            Err(e) => {
                tracing::error!("Error inserting data for {}: {}", record.swift_code, e);
                report.failed += 1;
            }
        }
    }

    tracing::info!(
        "Ingestion finished: {} inserted, {} duplicates, {} skipped, {} failed",
        report.inserted,
        report.duplicates,
        report.skipped,
        report.failed
    );
    report
}

/// Loads the data file at `path` into `store`.
///
/// A missing file is reported and yields an empty report; the service still
/// starts with whatever the store already holds.
pub async fn seed_from_path(store: &dyn SwiftCodeStore, path: &Path) -> IngestReport {
    match open_swift_codes(path) {
        Ok(records) => {
            tracing::info!("Loading SWIFT codes from {}", path.display());
            seed_store(store, records).await
        }
        Err(e) => {
            tracing::warn!("SWIFT data file {} not loaded: {}", path.display(), e);
            IngestReport::default()
        }
    }
}
