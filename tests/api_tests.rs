/// HTTP tests for the SWIFT code endpoints
/// Drives the full router against the in-memory store
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use swift_codes_api::api;
use swift_codes_api::db_storage::{InMemorySwiftCodeStore, StoreError, SwiftCodeStore};
use swift_codes_api::handlers::AppState;
use swift_codes_api::ingestion::{read_swift_codes, seed_store};
use swift_codes_api::models::{InsertOutcome, SwiftCode};

fn app_with(store: Arc<dyn SwiftCodeStore>) -> Router {
    api::router(Arc::new(AppState::new(store)))
}

fn app() -> (Router, Arc<InMemorySwiftCodeStore>) {
    let store = Arc::new(InMemorySwiftCodeStore::new());
    (app_with(store.clone()), store)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn swift_code_body(code: &str, country: &str, bank: &str) -> Value {
    json!({
        "swiftCode": code,
        "countryISO2": country,
        "countryName": "United States",
        "address": "1 Main St",
        "bankName": bank
    })
}

#[tokio::test]
async fn test_headquarter_with_branch_roundtrip() {
    let (app, _) = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/swift-codes",
        Some(swift_code_body("AAAAUS33XXX", "US", "Test Bank")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "SWIFT code AAAAUS33XXX added successfully");

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/swift-codes",
        Some(swift_code_body("AAAAUS33001", "US", "Test Bank")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::GET, "/v1/swift-codes/aaaaus33xxx", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "address": "1 Main St",
            "bankName": "Test Bank",
            "countryISO2": "US",
            "countryName": "UNITED STATES",
            "isHeadquarter": true,
            "swiftCode": "AAAAUS33XXX",
            "branches": [{
                "address": "1 Main St",
                "bankName": "Test Bank",
                "countryISO2": "US",
                "isHeadquarter": false,
                "swiftCode": "AAAAUS33001"
            }]
        })
    );
}

#[tokio::test]
async fn test_branch_lookup_has_no_branches_field() {
    let (app, _) = app();
    send(&app, Method::POST, "/v1/swift-codes", Some(swift_code_body("AAAAUS33XXX", "US", "B"))).await;
    send(&app, Method::POST, "/v1/swift-codes", Some(swift_code_body("AAAAUS33001", "US", "B"))).await;

    let (status, body) = send(&app, Method::GET, "/v1/swift-codes/AAAAUS33001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isHeadquarter"], false);
    assert!(body.get("branches").is_none());
}

#[tokio::test]
async fn test_unknown_code_returns_404() {
    let (app, _) = app();
    let (status, body) = send(&app, Method::GET, "/v1/swift-codes/ZZZZUS33XXX", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("ZZZZUS33XXX"));
}

#[tokio::test]
async fn test_missing_display_fields_use_placeholders() {
    let (app, _) = app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/swift-codes",
        Some(json!({
            "swiftCode": "CCCCDEFFXXX",
            "countryISO2": "DE",
            "countryName": "Germany"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app, Method::GET, "/v1/swift-codes/CCCCDEFFXXX", None).await;
    assert_eq!(body["address"], "N/A");
    assert_eq!(body["bankName"], "Unknown Bank");
    assert_eq!(body["branches"], json!([]));
}

#[tokio::test]
async fn test_country_listing() {
    let (app, _) = app();
    for code in ["AAAAUS33XXX", "AAAAUS33001", "BBBBUS44XXX"] {
        send(&app, Method::POST, "/v1/swift-codes", Some(swift_code_body(code, "US", "B"))).await;
    }
    send(
        &app,
        Method::POST,
        "/v1/swift-codes",
        Some(json!({"swiftCode": "CCCCDEFFXXX", "countryISO2": "DE", "countryName": "Germany"})),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/v1/swift-codes/country/us", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["countryISO2"], "US");
    assert_eq!(body["countryName"], "UNITED STATES");
    let codes: Vec<&str> = body["swiftCodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["swiftCode"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["AAAAUS33001", "AAAAUS33XXX", "BBBBUS44XXX"]);
    assert!(body["swiftCodes"][0].get("countryName").is_none());
}

#[tokio::test]
async fn test_empty_country_returns_404() {
    let (app, _) = app();
    let (status, body) = send(&app, Method::GET, "/v1/swift-codes/country/PL", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_duplicate_insert_is_absorbed() {
    let (app, store) = app();
    let (first, _) = send(
        &app,
        Method::POST,
        "/v1/swift-codes",
        Some(swift_code_body("AAAAUS33XXX", "US", "First Bank")),
    )
    .await;
    let (second, body) = send(
        &app,
        Method::POST,
        "/v1/swift-codes",
        Some(swift_code_body("AAAAUS33XXX", "US", "Second Bank")),
    )
    .await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(body["message"], "SWIFT code AAAAUS33XXX already exists");
    assert_eq!(store.len().await, 1);

    let (_, body) = send(&app, Method::GET, "/v1/swift-codes/AAAAUS33XXX", None).await;
    assert_eq!(body["bankName"], "First Bank");
}

#[tokio::test]
async fn test_malformed_payloads_return_400() {
    let (app, store) = app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/swift-codes")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/swift-codes",
        Some(json!({"swiftCode": "AAAAUS33XXX"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/swift-codes",
        Some(swift_code_body("NOTACODE", "US", "B")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_values_wider_than_columns_return_400() {
    let (app, store) = app();

    let long_bank = swift_code_body("AAAAUS33XXX", "US", &"B".repeat(256));
    let mut long_address = swift_code_body("AAAAUS33XXX", "US", "B");
    long_address["address"] = json!("A".repeat(256));
    let mut long_country = swift_code_body("AAAAUS33XXX", "US", "B");
    long_country["countryName"] = json!("N".repeat(101));
    let mut long_headquarter = swift_code_body("AAAAUS33001", "US", "B");
    long_headquarter["headquarterCode"] = json!("AAAAUS33XXXXXXXXX");
    let mut self_headquarter = swift_code_body("AAAAUS33001", "US", "B");
    self_headquarter["headquarterCode"] = json!("AAAAUS33001");

    for body in [
        long_bank,
        long_address,
        long_country,
        long_headquarter,
        self_headquarter,
    ] {
        let (status, response) = send(&app, Method::POST, "/v1/swift-codes", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response["error"].is_string());
    }

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_delete_flow() {
    let (app, store) = app();
    send(&app, Method::POST, "/v1/swift-codes", Some(swift_code_body("AAAAUS33XXX", "US", "B"))).await;

    let (status, body) = send(&app, Method::DELETE, "/v1/swift-codes/aaaaus33xxx", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "SWIFT code AAAAUS33XXX successfully deleted");

    let (status, _) = send(&app, Method::GET, "/v1/swift-codes/AAAAUS33XXX", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/v1/swift-codes/AAAAUS33XXX", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_seeded_data_served_over_http() {
    let store = Arc::new(InMemorySwiftCodeStore::new());
    let csv = "COUNTRY ISO2 CODE,SWIFT CODE,CODE TYPE,NAME,ADDRESS,TOWN NAME,COUNTRY NAME,TIME ZONE\n\
               PL,BBBBPLPW001,BIC11,Early Branch,Addr,Warsaw,Poland,Europe/Warsaw\n\
               PL,BBBBPLPWXXX,BIC11,Bank,Addr,Warsaw,Poland,Europe/Warsaw\n\
               PL,BBBBPLPW002,BIC11,Late Branch,Addr,Warsaw,Poland,Europe/Warsaw\n";
    seed_store(store.as_ref(), read_swift_codes(csv.as_bytes())).await;
    let app = app_with(store);

    let (status, body) = send(&app, Method::GET, "/v1/swift-codes/BBBBPLPWXXX", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["countryName"], "POLAND");
    let branches = body["branches"].as_array().unwrap();
    assert_eq!(branches.len(), 1);
    assert_eq!(branches[0]["swiftCode"], "BBBBPLPW002");
}

#[tokio::test]
async fn test_health_and_openapi_document() {
    let (app, _) = app();

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/v1/swift-codes/{code}").is_some());
}

/// Store whose backend is always down.
struct BrokenStore;

#[async_trait]
impl SwiftCodeStore for BrokenStore {
    async fn insert(&self, _record: &SwiftCode) -> Result<InsertOutcome, StoreError> {
        Err(StoreError::Storage(sqlx::Error::PoolClosed))
    }

    async fn get_by_code(&self, _code: &str) -> Result<SwiftCode, StoreError> {
        Err(StoreError::Storage(sqlx::Error::PoolClosed))
    }

    async fn list_by_country(&self, _country_code: &str) -> Result<Vec<SwiftCode>, StoreError> {
        Err(StoreError::Storage(sqlx::Error::PoolClosed))
    }

    async fn delete_by_code(&self, _code: &str) -> Result<(), StoreError> {
        Err(StoreError::Storage(sqlx::Error::PoolClosed))
    }
}

#[tokio::test]
async fn test_storage_failures_return_500() {
    let app = app_with(Arc::new(BrokenStore));

    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/swift-codes",
        Some(swift_code_body("AAAAUS33XXX", "US", "B")),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Database error");

    let (status, _) = send(&app, Method::GET, "/v1/swift-codes/AAAAUS33XXX", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = send(&app, Method::DELETE, "/v1/swift-codes/AAAAUS33XXX", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
