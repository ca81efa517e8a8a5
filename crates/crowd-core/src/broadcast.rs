//! Live sync: update event assembly and the [`EventSink`] seam.
//!
//! The core never talks to a transport directly. After each mutation the
//! store calls [`publish`], which builds a [`DensityEvent::Update`] from
//! the freshly sampled record and hands it to whatever [`EventSink`] the
//! store was built with. Delivery is fire-and-forget.

use crowd_types::DensityEvent;
use tracing::warn;

use crate::predictor;
use crate::registry::LocationRegistry;

/// Destination for update events.
///
/// Implementations must not block: `publish` is called while the
/// registry write lock is held. Failing to deliver to some or all
/// subscribers is not reported back to the caller.
pub trait EventSink: Send + Sync {
    /// Hand an event to every current subscriber.
    fn publish(&self, event: &DensityEvent);
}

/// A sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: &DensityEvent) {}
}

/// Build the update event for `key` from the registry's current state.
///
/// Returns `None` if the key is not registered.
pub fn update_event(registry: &LocationRegistry, key: &str) -> Option<DensityEvent> {
    let record = registry.get(key)?;
    Some(DensityEvent::Update {
        location: key.to_owned(),
        prediction: predictor::predict_next(record),
        data: record.clone(),
    })
}

/// Compute the forecast for `key` and emit an update to `sink`.
pub fn publish(sink: &dyn EventSink, registry: &LocationRegistry, key: &str) {
    let Some(event) = update_event(registry, key) else {
        warn!(location = key, "Skipping broadcast for unregistered location");
        return;
    };
    sink.publish(&event);
}
