//! HTTP server initialization and runtime setup.
//!
//! Handles storage selection, the deletion pipeline and the Axum server
//! lifecycle.

use crate::application::services::{ShortenerService, UserAuthService};
use crate::config::Config;
use crate::domain::deletion::BatchDeleter;
use crate::infrastructure::persistence::build_repository;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - URL storage (PostgreSQL, file or in-memory)
/// - Batch deletion pipeline
/// - Axum HTTP server with graceful shutdown
///
/// On shutdown the server stops accepting connections, finishes in-flight
/// requests, then closes the deleter so queued deletions get a final flush.
///
/// # Errors
///
/// Returns an error if:
/// - Storage initialization fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repository = build_repository(&config).await?;

    let deleter = Arc::new(
        BatchDeleter::spawn(repository.clone(), config.deleter_config())
            .context("Failed to start batch deleter")?,
    );

    let shortener_service = Arc::new(ShortenerService::new(
        repository,
        deleter.clone(),
        config.base_url(),
    ));
    let auth_service = Arc::new(UserAuthService::new(config.auth_secret.clone()));
    let state = AppState::new(shortener_service, auth_service);

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    deleter.close().await;
    tracing::info!("Server stopped");

    served?;
    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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
