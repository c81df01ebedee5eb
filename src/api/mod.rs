// Thin namespace wrapper for API-layer components, plus router assembly
pub mod handlers {
    pub use crate::handlers::*;
}

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::AppState;
use crate::models::{
    CountrySwiftCodesResponse, MessageResponse, NewSwiftCode, SwiftCodeResponse, SwiftCodeSummary,
};

/// Request payload cap for `POST /v1/swift-codes`.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::get_swift_code,
        crate::handlers::get_swift_codes_by_country,
        crate::handlers::add_swift_code,
        crate::handlers::delete_swift_code,
    ),
    components(schemas(
        SwiftCodeResponse,
        SwiftCodeSummary,
        CountrySwiftCodesResponse,
        NewSwiftCode,
        MessageResponse
    )),
    tags((name = "swift-codes", description = "SWIFT code registry"))
)]
pub struct ApiDoc;

/// The `/v1/swift-codes` routes, without state or outer layers.
pub fn swift_code_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/swift-codes", post(crate::handlers::add_swift_code))
        .route(
            "/v1/swift-codes/country/:country_iso2",
            get(crate::handlers::get_swift_codes_by_country),
        )
        .route(
            "/v1/swift-codes/:code",
            get(crate::handlers::get_swift_code).delete(crate::handlers::delete_swift_code),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}

/// Health, documentation and registry routes with tracing and CORS.
///
/// `api_routes` is usually [`swift_code_routes`], optionally wrapped in a
/// rate limiter by the caller.
pub fn build_router(state: Arc<AppState>, api_routes: Router<Arc<AppState>>) -> Router {
    Router::new()
        .route("/health", get(crate::handlers::health))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Full application router without rate limiting.
pub fn router(state: Arc<AppState>) -> Router {
    build_router(state, swift_code_routes())
}
