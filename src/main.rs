use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use investing_coach_api::app;
use investing_coach_api::config::Config;
use investing_coach_api::handlers::AppState;
use investing_coach_api::store;

/// Main entry point for the application.
///
/// Initializes tracing, loads configuration, opens the document store handle
/// and starts the Axum server. A store that cannot be opened leaves the handle
/// absent instead of aborting, so `GET /test` can report the problem.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "investing_coach_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    let store = match store::open(&config).await {
        Ok(store) => {
            tracing::info!("✓ Document store ready: {}", store.database_name());
            Some(store)
        }
        Err(e) => {
            tracing::error!("Document store unavailable, running degraded: {}", e);
            None
        }
    };

    let app_state = Arc::new(AppState {
        config: config.clone(),
        store,
    });

    let app = app::router(app_state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
