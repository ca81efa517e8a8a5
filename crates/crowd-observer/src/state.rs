//! Shared application state for the dashboard API server.
//!
//! [`AppState`] pairs the core [`DensityStore`] with the
//! [`BroadcastSink`] the store publishes into. Handlers mutate through
//! the store; `WebSocket` sessions subscribe through the sink.

use std::sync::Arc;

use crowd_core::broadcast::EventSink;
use crowd_core::config::CrowdConfig;
use crowd_core::{DensityError, DensityStore};
use crowd_types::DensityEvent;
use tokio::sync::broadcast;
use tracing::debug;

/// [`EventSink`] backed by a Tokio broadcast channel.
///
/// Publishing never blocks and never fails from the caller's point of
/// view; with zero subscribers the event is simply dropped. A subscriber
/// that falls more than `capacity` events behind receives
/// [`broadcast::error::RecvError::Lagged`] and skips to the newest event.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<DensityEvent>,
}

impl BroadcastSink {
    /// Create a sink whose subscribers buffer up to `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<DensityEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl EventSink for BroadcastSink {
    fn publish(&self, event: &DensityEvent) {
        // send returns Err only when there are zero receivers,
        // which is normal when no WebSocket clients are connected.
        let receivers = self.tx.send(event.clone()).unwrap_or(0);
        debug!(location = event.location(), receivers, "Update broadcast sent");
    }
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The location registry and its mutation path.
    pub store: Arc<DensityStore>,
    /// The channel the store publishes into.
    pub sink: BroadcastSink,
}

impl AppState {
    /// Pair an existing store with the sink it publishes into.
    pub const fn new(store: Arc<DensityStore>, sink: BroadcastSink) -> Self {
        Self { store, sink }
    }

    /// Build a sink and a store seeded with the configured locations.
    ///
    /// # Errors
    ///
    /// Returns [`DensityError`] if a seed location is invalid.
    pub fn from_config(config: &CrowdConfig) -> Result<Self, DensityError> {
        let sink = BroadcastSink::new(config.broadcast_capacity);
        let store = DensityStore::seeded(&config.locations, Arc::new(sink.clone()))?;
        Ok(Self::new(Arc::new(store), sink))
    }

    /// Subscribe to the update stream.
    pub fn subscribe(&self) -> broadcast::Receiver<DensityEvent> {
        self.sink.subscribe()
    }
}
