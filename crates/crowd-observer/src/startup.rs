//! Server startup helper for embedding in the dashboard binary.
//!
//! Provides [`spawn_observer`] which launches the HTTP + `WebSocket`
//! server on a background Tokio task, so the binary can run the
//! simulation drivers alongside it.

use std::sync::Arc;

use crowd_core::config::ServerSettings;
use tokio::task::JoinHandle;

use crate::server::{ServerError, socket_addr};
use crate::state::AppState;

/// Errors that can occur when spawning the dashboard server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the dashboard HTTP server on a background Tokio task.
///
/// Returns a [`JoinHandle`] so the caller can abort the server during
/// shutdown.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the configured address cannot be
/// parsed. This is checked eagerly before the background task is
/// spawned; bind failures are logged from inside the task.
pub fn spawn_observer(
    settings: ServerSettings,
    state: Arc<AppState>,
) -> Result<JoinHandle<()>, StartupError> {
    let addr = socket_addr(&settings)?;

    let handle = tokio::spawn(async move {
        if let Err(e) = crate::server::start_server(&settings, state).await {
            tracing::error!(error = %e, "Dashboard server exited with error");
        }
    });

    tracing::info!(%addr, "Dashboard server spawned on background task");

    Ok(handle)
}
