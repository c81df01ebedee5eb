//! SWIFT Code Registry API Library
//!
//! Loads a reference dataset of SWIFT/BIC codes into Postgres and serves
//! lookups that resolve headquarters together with their branches.
//!
//! # Modules
//!
//! - `api`: Router assembly and OpenAPI document.
//! - `core`: Domain-layer re-exports.
//! - `config`: Configuration management.
//! - `db`: Database connection pool and schema setup.
//! - `db_storage`: The `SwiftCodeStore` trait with Postgres and in-memory stores.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `ingestion`: Data file parsing and headquarters linkage.
//! - `models`: Record model, derivation rules and API shapes.
//! - `resolution`: Headquarters/branch resolution service.

pub mod api;
pub mod core;

pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod handlers;
pub mod ingestion;
pub mod models;
pub mod resolution;
