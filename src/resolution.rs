//! Headquarters/branch resolution over the SWIFT code registry.
//!
//! Every call is a stateless read or write composed of at most two store
//! queries; the store handles isolation between concurrent requests.
use regex::Regex;
use std::sync::{Arc, OnceLock};

use crate::db_storage::{StoreError, SwiftCodeStore};
use crate::errors::AppError;
use crate::models::{
    headquarter_code_for, is_headquarter_code, linkage_prefix, non_blank, CountryBundle,
    InsertOutcome, NewSwiftCode, ResolvedSwiftCode, SwiftCode, COUNTRY_NAME_MAX_LEN,
    DISPLAY_TEXT_MAX_LEN,
};

fn swift_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Z]{4}[A-Z]{2}[A-Z0-9]{2}[A-Z0-9]{3}$").expect("valid SWIFT code regex")
    })
}

fn check_length(field: &str, value: Option<&str>, max: usize) -> Result<(), AppError> {
    match value {
        Some(v) if v.chars().count() > max => Err(AppError::BadRequest(format!(
            "{} exceeds {} characters",
            field, max
        ))),
        _ => Ok(()),
    }
}

/// Upper-cases and trims a code or country key taken from a request.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[derive(Clone)]
pub struct ResolutionService {
    store: Arc<dyn SwiftCodeStore>,
}

impl ResolutionService {
    pub fn new(store: Arc<dyn SwiftCodeStore>) -> Self {
        Self { store }
    }

    /// Fetches one code and, for a headquarters, the branches linked to it.
    ///
    /// Branches are drawn from the headquarters' country and kept in store
    /// order. A branch record resolves with `branches: None`.
    pub async fn resolve_swift_code(&self, code: &str) -> Result<ResolvedSwiftCode, AppError> {
        let code = normalize_key(code);
        let record = self.store.get_by_code(&code).await?;

        if !record.is_headquarter {
            return Ok(ResolvedSwiftCode {
                record,
                branches: None,
            });
        }

        let branches: Vec<SwiftCode> = self
            .store
            .list_by_country(&record.country_code)
            .await?
            .into_iter()
            .filter(|candidate| candidate.is_branch_of(&record.swift_code))
            .collect();

        tracing::debug!(
            "Resolved headquarters {} with {} branches",
            record.swift_code,
            branches.len()
        );

        Ok(ResolvedSwiftCode {
            record,
            branches: Some(branches),
        })
    }

    /// All codes for a country. An empty country is reported as not found.
    pub async fn resolve_country(&self, country_code: &str) -> Result<CountryBundle, AppError> {
        let country_code = normalize_key(country_code);
        let swift_codes = self.store.list_by_country(&country_code).await?;

        let country_name = match swift_codes.first() {
            Some(first) => first.country_name.clone(),
            None => {
                return Err(AppError::NotFound(format!(
                    "No SWIFT codes found for country {}",
                    country_code
                )))
            }
        };

        Ok(CountryBundle {
            country_code,
            country_name,
            swift_codes,
        })
    }

    /// Validates and stores a new code.
    ///
    /// A branch submitted without `headquarterCode` is linked to the stored
    /// headquarters sharing its prefix, if there is one.
    pub async fn register(&self, payload: NewSwiftCode) -> Result<(SwiftCode, InsertOutcome), AppError> {
        let record = self.validate(payload).await?;
        let outcome = self.store.insert(&record).await?;

        match outcome {
            InsertOutcome::Inserted => tracing::info!("SWIFT code {} added", record.swift_code),
            InsertOutcome::AlreadyExists => {
                tracing::warn!("SWIFT code {} already exists, insert ignored", record.swift_code)
            }
        }
        Ok((record, outcome))
    }

    pub async fn remove(&self, code: &str) -> Result<String, AppError> {
        let code = normalize_key(code);
        self.store.delete_by_code(&code).await?;
        tracing::info!("SWIFT code {} deleted", code);
        Ok(code)
    }

    async fn validate(&self, payload: NewSwiftCode) -> Result<SwiftCode, AppError> {
        let swift_code = normalize_key(&payload.swift_code);
        if !swift_code_pattern().is_match(&swift_code) {
            return Err(AppError::BadRequest(format!(
                "Invalid SWIFT code '{}': expected 11 characters (4 bank, 2 country, 2 location, 3 branch)",
                payload.swift_code
            )));
        }

        let country_code = normalize_key(&payload.country_iso2);
        if country_code.len() != 2 || !country_code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AppError::BadRequest(format!(
                "Invalid countryISO2 '{}': expected two letters",
                payload.country_iso2
            )));
        }
        if swift_code[4..6] != country_code {
            return Err(AppError::BadRequest(format!(
                "countryISO2 {} does not match SWIFT code {}",
                country_code, swift_code
            )));
        }

        let country_name = normalize_key(&payload.country_name);
        if country_name.is_empty() {
            return Err(AppError::BadRequest("countryName is required".to_string()));
        }
        check_length("countryName", Some(&country_name), COUNTRY_NAME_MAX_LEN)?;

        let address = non_blank(payload.address);
        let bank_name = non_blank(payload.bank_name);
        check_length("address", address.as_deref(), DISPLAY_TEXT_MAX_LEN)?;
        check_length("bankName", bank_name.as_deref(), DISPLAY_TEXT_MAX_LEN)?;

        let is_headquarter = payload
            .is_headquarter
            .unwrap_or_else(|| is_headquarter_code(&swift_code));

        let headquarter_code = if is_headquarter {
            None
        } else {
            self.headquarter_for_branch(&swift_code, payload.headquarter_code)
                .await?
        };

        Ok(SwiftCode {
            swift_code,
            country_code,
            country_name,
            is_headquarter,
            headquarter_code,
            address,
            bank_name,
        })
    }

    async fn headquarter_for_branch(
        &self,
        swift_code: &str,
        requested: Option<String>,
    ) -> Result<Option<String>, AppError> {
        let prefix = linkage_prefix(swift_code)?;

        if let Some(requested) = non_blank(requested) {
            let requested = normalize_key(&requested);
            if !swift_code_pattern().is_match(&requested) || !is_headquarter_code(&requested) {
                return Err(AppError::BadRequest(format!(
                    "Invalid headquarterCode '{}': expected an 11-character code ending in XXX",
                    requested
                )));
            }
            if requested == swift_code {
                return Err(AppError::BadRequest(format!(
                    "SWIFT code {} cannot be its own headquarters",
                    swift_code
                )));
            }
            if linkage_prefix(&requested)? != prefix {
                return Err(AppError::BadRequest(format!(
                    "headquarterCode {} does not share the prefix {} of {}",
                    requested, prefix, swift_code
                )));
            }
            return Ok(Some(requested));
        }

        let candidate = headquarter_code_for(swift_code)?;
        if candidate == swift_code {
            return Ok(None);
        }
        match self.store.get_by_code(&candidate).await {
            Ok(headquarter) if headquarter.is_headquarter => Ok(Some(headquarter.swift_code)),
            Ok(_) | Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
