use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swift_codes_api::api;
use swift_codes_api::config::Config;
use swift_codes_api::db::Database;
use swift_codes_api::db_storage::{PgSwiftCodeStore, SwiftCodeStore};
use swift_codes_api::handlers::AppState;
use swift_codes_api::ingestion;

/// Main entry point for the application.
///
/// Initializes logging, configuration and the database, runs the one-shot
/// ingestion pass, then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "swift_codes_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db = Database::connect(&config.database_url, config.max_connections).await?;
    db.ensure_schema().await?;
    tracing::info!("Database connection pool established");

    let store: Arc<dyn SwiftCodeStore> = Arc::new(PgSwiftCodeStore::new(db.pool.clone()));

    // Ingestion completes before the listener is bound
    ingestion::seed_from_path(store.as_ref(), &config.data_path).await;

    let app_state = Arc::new(AppState::new(store));

    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(config.rate_limit_per_second)
            .burst_size(config.rate_limit_burst)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("invalid rate limit configuration"))?,
    );

    // Health and docs bypass rate limiting
    let limited_routes: Router<Arc<AppState>> = api::swift_code_routes().layer(
        ServiceBuilder::new().layer(GovernorLayer {
            config: governor_conf,
        }),
    );
    let app = api::build_router(app_state, limited_routes);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
