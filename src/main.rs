use anyhow::Result;
use tokio::net::TcpListener;
use tokio::signal;

use notification_template_service::config::Settings;
use notification_template_service::postgres::PostgresPool;
use notification_template_service::server::{create_app, AppState};
use notification_template_service::store::create_store;
use notification_template_service::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing
    init_tracing(&settings.logging);
    tracing::info!(run_mode = ?std::env::var("RUN_MODE").ok(), "Configuration loaded");

    // Open the database first so a bad URL stops startup
    let postgres_pool = if settings.database.backend == "postgres" {
        Some(PostgresPool::connect(&settings.database).await?)
    } else {
        None
    };

    let store = create_store(&settings.database, postgres_pool.as_ref());

    // Create application state
    let addr = settings.server_addr();
    let state = AppState::new(settings, store);
    tracing::info!("Application state initialized");

    // Create Axum app
    let app = create_app(state);

    // Start server
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal_handler())
        .await?;

    if let Some(pool) = postgres_pool {
        pool.close().await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal_handler() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
