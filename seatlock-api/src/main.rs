use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use seatlock_api::{app, app_config::Config, worker, AppState};
use seatlock_core::SeatRegistry;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seatlock_api=debug,seatlock_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!(
        "Starting seat registry: {} seats, {}s lock, {}s sweep",
        config.registry.total_seats,
        config.registry.lock_duration_seconds,
        config.registry.sweep_interval_seconds
    );

    let registry = Arc::new(
        SeatRegistry::new(config.registry.settings()).context("Failed to build seat registry")?,
    );

    let shutdown = CancellationToken::new();
    let sweeper = worker::spawn_sweep_worker(
        registry.clone(),
        config.registry.sweep_interval(),
        shutdown.clone(),
    );

    let app = app(AppState::new(registry));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    shutdown.cancel();
    sweeper.await.context("Sweep worker panicked")?;
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves on ctrl-c, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to register SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("Shutdown signal received");
}
