use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tracing::info;

use sourcing_market::api::create_router_with_timeout;
use sourcing_market::app::{AppConfig, AppState};
use sourcing_market::infra::{PostgresClient, init_metrics_handle, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenv().ok();

    let config = AppConfig::from_env().context("invalid configuration")?;
    init_tracing(config.log_format);
    let metrics = init_metrics_handle();

    let store = PostgresClient::new(&config.database_url, config.postgres.clone())
        .await
        .context("failed to connect to PostgreSQL")?;
    store
        .run_migrations()
        .await
        .context("failed to run migrations")?;

    let mut state = AppState::new(Arc::new(store), config.api_auth_key.clone());
    if let Some(handle) = metrics {
        state = state.with_metrics(handle);
    }

    let router = create_router_with_timeout(Arc::new(state), config.request_timeout);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "Server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
