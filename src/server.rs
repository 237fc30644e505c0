//! HTTP server initialization and runtime setup.
//!
//! Connects the pool, applies migrations, starts the pixel worker and serves
//! until SIGINT/SIGTERM.

use crate::config::Config;
use crate::domain::click_worker::run_click_worker;
use crate::routes::app_router;
use crate::state::{AppState, StateSettings};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::mpsc;

/// Grace period for the click worker to drain after the server stops.
const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the service until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if the database is unreachable, migrations fail, the
/// listen address is invalid or the server fails at runtime.
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to apply migrations")?;
    tracing::info!("Migrations applied");

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);

    let state = AppState::new(Arc::new(pool), click_tx, StateSettings::from(&config));

    let worker = tokio::spawn(run_click_worker(
        click_rx,
        state.click_service.clone(),
        config.click_worker_concurrency,
    ));
    tracing::info!(
        concurrency = config.click_worker_concurrency,
        "Click worker started"
    );

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    // The router owned the last sender; the worker exits once the queue drains.
    match tokio::time::timeout(WORKER_DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => tracing::info!("Click worker drained"),
        Ok(Err(e)) => tracing::error!(error = %e, "Click worker panicked"),
        Err(_) => tracing::warn!("Click worker did not drain in time, pending clicks lost"),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    tracing::info!("Shutdown signal received, draining connections");
}
