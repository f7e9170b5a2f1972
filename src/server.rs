use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::{
    config::AppConfig,
    storage::JsonDatabase,
    web::{AppState, build_router},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Interrupt,
    Terminate,
}

/// Opens the store, binds `config.address()` and serves until `shutdown`
/// resolves. In-flight requests are drained before returning.
pub async fn serve<F>(config: &AppConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ShutdownReason> + Send + 'static,
{
    let db = Arc::new(JsonDatabase::new(config.store_config()));
    db.initialize()
        .await
        .with_context(|| format!("failed to initialize database at {}", db.path().display()))?;

    let app = build_router(AppState::from_database(db));

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    let local = listener.local_addr().context("listener has no local address")?;

    info!(address = %local, "task control api started");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let reason = shutdown.await;
            info!(?reason, "shutdown signal received");
        })
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix. A handler that cannot be
/// installed is logged and never fires.
pub async fn shutdown_signal() -> ShutdownReason {
    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => ShutdownReason::Interrupt,
        _ = terminate => ShutdownReason::Terminate,
    }
}
