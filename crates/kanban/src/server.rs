//! Running the HTTP server.

use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::http::{build_router, AppState};
use crate::service::BoardService;
use crate::storage::open_store;

/// Build the multi-threaded runtime the server runs on.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created.
pub fn runtime(config: &Config) -> Result<tokio::runtime::Runtime> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.workers)
        .thread_name("kanban-worker")
        .enable_all()
        .build()?;
    Ok(runtime)
}

/// Open the configured store and serve the board until a shutdown signal.
///
/// # Errors
///
/// Returns an error if the store cannot be opened, the address cannot be
/// bound, or the server fails while running.
pub async fn serve(config: &Config) -> Result<()> {
    let addr = config.bind_addr()?;
    let store = open_store(config).await?;
    let state = AppState::with_config(BoardService::new(store), &config.server)?;
    let app = build_router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(
        addr = %listener.local_addr()?,
        backend = %config.storage.backend,
        workers = config.server.workers,
        "kanban listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("shutdown signal received");
}
