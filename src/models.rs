use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Branch suffix reserved for headquarters entries.
pub const HEADQUARTER_SUFFIX: &str = "XXX";

/// Number of leading characters shared by a headquarters and its branches.
pub const LINKAGE_PREFIX_LEN: usize = 8;

/// Column limits of the `swift_codes` table, in characters.
pub const COUNTRY_NAME_MAX_LEN: usize = 100;
pub const DISPLAY_TEXT_MAX_LEN: usize = 255;

/// Display value used when a record has no address on file.
pub const ADDRESS_PLACEHOLDER: &str = "N/A";

/// Display value used when a record has no bank name on file.
pub const BANK_NAME_PLACEHOLDER: &str = "Unknown Bank";

/// Errors raised by the code derivation rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodeError {
    #[error("invalid SWIFT code '{0}': expected at least 8 characters")]
    InvalidCode(String),
}

/// Returns true when `code` carries the headquarters branch suffix.
pub fn is_headquarter_code(code: &str) -> bool {
    code.ends_with(HEADQUARTER_SUFFIX)
}

/// Returns the 8-character prefix that links a branch to its headquarters.
///
/// Institution, country and location segments together form the prefix; the
/// trailing branch segment is not part of it.
pub fn linkage_prefix(code: &str) -> Result<&str, CodeError> {
    code.get(..LINKAGE_PREFIX_LEN)
        .ok_or_else(|| CodeError::InvalidCode(code.to_string()))
}

/// Builds the headquarters code a branch would belong to.
pub fn headquarter_code_for(code: &str) -> Result<String, CodeError> {
    linkage_prefix(code).map(|prefix| format!("{prefix}{HEADQUARTER_SUFFIX}"))
}

/// Treats empty or whitespace-only display text as missing.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ============ Database Models ============

/// A single row of the `swift_codes` table.
///
/// Optional fields stay optional here; placeholders for missing display
/// values are applied only when building responses.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SwiftCode {
    /// 11-character bank identifier, primary key.
    pub swift_code: String,
    /// ISO 3166 alpha-2 country code, upper case.
    pub country_code: String,
    /// Country name, upper case.
    pub country_name: String,
    /// Whether this entry is the headquarters of its banking group.
    pub is_headquarter: bool,
    /// Code of the owning headquarters, only ever set on branches.
    #[sqlx(rename = "headquarter_swift_code")]
    pub headquarter_code: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// Registered bank name.
    pub bank_name: Option<String>,
}

impl SwiftCode {
    /// True when this record is a branch linked to `headquarter_code`.
    pub fn is_branch_of(&self, headquarter_code: &str) -> bool {
        !self.is_headquarter && self.headquarter_code.as_deref() == Some(headquarter_code)
    }

    pub fn display_address(&self) -> &str {
        self.address.as_deref().unwrap_or(ADDRESS_PLACEHOLDER)
    }

    pub fn display_bank_name(&self) -> &str {
        self.bank_name.as_deref().unwrap_or(BANK_NAME_PLACEHOLDER)
    }
}

/// Outcome of an insert against the registry.
///
/// Duplicate keys are not an error: the first write wins and later writes
/// for the same code are reported as `AlreadyExists`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

/// A headquarters or branch record together with its resolved branches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSwiftCode {
    pub record: SwiftCode,
    /// `Some` for headquarters (possibly empty), `None` for branches.
    pub branches: Option<Vec<SwiftCode>>,
}

/// Every record registered for one country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryBundle {
    pub country_code: String,
    pub country_name: String,
    pub swift_codes: Vec<SwiftCode>,
}

// ============ API Request Models ============

/// Request body for `POST /v1/swift-codes`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewSwiftCode {
    /// 11-character SWIFT/BIC code.
    #[schema(example = "AAAAUS33XXX")]
    pub swift_code: String,
    /// ISO 3166 alpha-2 country code; must match characters 5-6 of the code.
    #[serde(rename = "countryISO2", alias = "countryCode")]
    #[schema(example = "US")]
    pub country_iso2: String,
    #[schema(example = "UNITED STATES")]
    pub country_name: String,
    /// Derived from the code suffix when omitted.
    #[serde(default)]
    pub is_headquarter: Option<bool>,
    /// Owning headquarters; looked up from the code prefix when omitted.
    #[serde(default, alias = "headquarterSwiftCode")]
    pub headquarter_code: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
}

// ============ API Response Models ============

/// Compact representation used for branch lists and country listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwiftCodeSummary {
    pub address: String,
    pub bank_name: String,
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    pub is_headquarter: bool,
    pub swift_code: String,
}

impl From<&SwiftCode> for SwiftCodeSummary {
    fn from(record: &SwiftCode) -> Self {
        Self {
            address: record.display_address().to_string(),
            bank_name: record.display_bank_name().to_string(),
            country_iso2: record.country_code.clone(),
            is_headquarter: record.is_headquarter,
            swift_code: record.swift_code.clone(),
        }
    }
}

/// Response for `GET /v1/swift-codes/{code}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwiftCodeResponse {
    pub address: String,
    pub bank_name: String,
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    pub country_name: String,
    pub is_headquarter: bool,
    pub swift_code: String,
    /// Present for headquarters only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<SwiftCodeSummary>>,
}

impl From<ResolvedSwiftCode> for SwiftCodeResponse {
    fn from(resolved: ResolvedSwiftCode) -> Self {
        let ResolvedSwiftCode { record, branches } = resolved;
        Self {
            address: record.display_address().to_string(),
            bank_name: record.display_bank_name().to_string(),
            country_iso2: record.country_code,
            country_name: record.country_name,
            is_headquarter: record.is_headquarter,
            swift_code: record.swift_code,
            branches: branches.map(|list| list.iter().map(SwiftCodeSummary::from).collect()),
        }
    }
}

/// Response for `GET /v1/swift-codes/country/{countryISO2}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CountrySwiftCodesResponse {
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,
    pub country_name: String,
    pub swift_codes: Vec<SwiftCodeSummary>,
}

impl From<CountryBundle> for CountrySwiftCodesResponse {
    fn from(bundle: CountryBundle) -> Self {
        Self {
            country_iso2: bundle.country_code,
            country_name: bundle.country_name,
            swift_codes: bundle.swift_codes.iter().map(SwiftCodeSummary::from).collect(),
        }
    }
}

/// Plain confirmation body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
