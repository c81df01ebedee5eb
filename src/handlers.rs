use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::db_storage::SwiftCodeStore;
use crate::errors::AppError;
use crate::models::{
    CountrySwiftCodesResponse, InsertOutcome, MessageResponse, NewSwiftCode, SwiftCodeResponse,
};
use crate::resolution::ResolutionService;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Headquarters/branch resolution over the registry store.
    pub resolver: ResolutionService,
}

impl AppState {
    pub fn new(store: Arc<dyn SwiftCodeStore>) -> Self {
        Self {
            resolver: ResolutionService::new(store),
        }
    }
}

/// Health check endpoint.
///
/// Returns the service status and version.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "swift-codes-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /v1/swift-codes/:code
///
/// Returns one SWIFT code. Headquarters carry a `branches` list of every
/// branch linked to them.
#[utoipa::path(
    get,
    path = "/v1/swift-codes/{code}",
    params(("code" = String, Path, description = "SWIFT/BIC code, case-insensitive")),
    responses(
        (status = 200, description = "SWIFT code details", body = SwiftCodeResponse),
        (status = 404, description = "SWIFT code not found")
    )
)]
pub async fn get_swift_code(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<SwiftCodeResponse>, AppError> {
    tracing::debug!("GET /v1/swift-codes/{}", code);

    let resolved = state.resolver.resolve_swift_code(&code).await?;
    Ok(Json(resolved.into()))
}

/// GET /v1/swift-codes/country/:country_iso2
///
/// Returns every headquarters and branch registered for a country.
#[utoipa::path(
    get,
    path = "/v1/swift-codes/country/{countryISO2}",
    params(("countryISO2" = String, Path, description = "ISO 3166 alpha-2 country code")),
    responses(
        (status = 200, description = "All SWIFT codes of the country", body = CountrySwiftCodesResponse),
        (status = 404, description = "No SWIFT codes for this country")
    )
)]
pub async fn get_swift_codes_by_country(
    State(state): State<Arc<AppState>>,
    Path(country_iso2): Path<String>,
) -> Result<Json<CountrySwiftCodesResponse>, AppError> {
    tracing::debug!("GET /v1/swift-codes/country/{}", country_iso2);

    let bundle = state.resolver.resolve_country(&country_iso2).await?;
    Ok(Json(bundle.into()))
}

/// POST /v1/swift-codes
///
/// Adds a SWIFT code. Re-submitting an existing code is a no-op answered
/// with 200 instead of 201.
#[utoipa::path(
    post,
    path = "/v1/swift-codes",
    request_body = NewSwiftCode,
    responses(
        (status = 201, description = "SWIFT code added", body = MessageResponse),
        (status = 200, description = "SWIFT code already present, nothing changed", body = MessageResponse),
        (status = 400, description = "Malformed payload"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn add_swift_code(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewSwiftCode>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let Json(payload) = payload?;
    tracing::debug!("POST /v1/swift-codes - code: {}", payload.swift_code);

    let (record, outcome) = state.resolver.register(payload).await?;

    let response = match outcome {
        InsertOutcome::Inserted => (
            StatusCode::CREATED,
            Json(MessageResponse::new(format!(
                "SWIFT code {} added successfully",
                record.swift_code
            ))),
        ),
        InsertOutcome::AlreadyExists => (
            StatusCode::OK,
            Json(MessageResponse::new(format!(
                "SWIFT code {} already exists",
                record.swift_code
            ))),
        ),
    };
    Ok(response)
}

/// DELETE /v1/swift-codes/:code
#[utoipa::path(
    delete,
    path = "/v1/swift-codes/{code}",
    params(("code" = String, Path, description = "SWIFT/BIC code, case-insensitive")),
    responses(
        (status = 200, description = "SWIFT code deleted", body = MessageResponse),
        (status = 404, description = "SWIFT code not found")
    )
)]
pub async fn delete_swift_code(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    tracing::debug!("DELETE /v1/swift-codes/{}", code);

    let deleted = state.resolver.remove(&code).await?;
    Ok(Json(MessageResponse::new(format!(
        "SWIFT code {} successfully deleted",
        deleted
    ))))
}
