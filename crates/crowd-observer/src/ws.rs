//! `WebSocket` handler for real-time location updates.
//!
//! Clients connect to `GET /ws`. Each client first receives one
//! JSON-encoded [`DensityEvent::Init`] with the whole registry, then a
//! [`DensityEvent::Update`] for every mutation. The snapshot and the
//! subscription are taken under the same registry lock, so nothing falls
//! between them.
//!
//! If a client falls behind, lagged messages are silently skipped and
//! the client resumes from the most recent update.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use crowd_types::DensityEvent;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming location updates.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_updates(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Serialize an event into a text frame.
fn to_message(event: &DensityEvent) -> Option<Message> {
    serde_json::to_string(event)
        .inspect_err(|e| warn!("Failed to serialize density event: {e}"))
        .ok()
        .map(|json| Message::Text(json.into()))
}

/// Handle the `WebSocket` lifecycle: send the snapshot, then forward
/// each update as a text frame until either side goes away.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let (locations, mut rx) = state.store.snapshot_and(|| state.subscribe()).await;
    debug!(locations = locations.len(), "WebSocket client connected");

    let Some(init) = to_message(&DensityEvent::Init { locations }) else {
        return;
    };
    if socket.send(init).await.is_err() {
        debug!("WebSocket client disconnected before snapshot");
        return;
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(event) => {
                        let Some(msg) = to_message(&event) else {
                            continue;
                        };
                        if socket.send(msg).await.is_err() {
                            debug!("WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    _ => {}
                }
            }
        }
    }
}
