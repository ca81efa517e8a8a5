//! Events pushed to live dashboard subscribers.
//!
//! Every subscriber first receives one [`DensityEvent::Init`] carrying the
//! full registry, then one [`DensityEvent::Update`] per applied mutation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::structs::LocationRecord;

/// A message on the live update stream.
///
/// Serialized as JSON internally tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum DensityEvent {
    /// Full snapshot, sent once to a newly connected subscriber.
    Init {
        /// Every known location keyed by registry key.
        locations: BTreeMap<String, LocationRecord>,
    },
    /// A single location changed.
    Update {
        /// Registry key of the changed location.
        location: String,
        /// The record after the mutation and its sample were applied.
        data: LocationRecord,
        /// Forecast computed from the updated history.
        prediction: u32,
    },
}

impl DensityEvent {
    /// Registry key this event is scoped to, if any.
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Init { .. } => None,
            Self::Update { location, .. } => Some(location),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::structs::Coordinates;

    #[test]
    fn update_event_wire_shape() {
        let mut data = LocationRecord::new("College Grounds", Coordinates(12.9719, 77.5946));
        data.history.push(4);
        let event = DensityEvent::Update {
            location: String::from("college"),
            data,
            prediction: 4,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "update");
        assert_eq!(json["location"], "college");
        assert_eq!(json["data"]["history"][0], 4);
        assert_eq!(json["prediction"], 4);
        assert_eq!(event.location(), Some("college"));
    }

    #[test]
    fn init_event_wire_shape() {
        let mut locations = BTreeMap::new();
        locations.insert(
            String::from("library"),
            LocationRecord::new("Library", Coordinates(12.9725, 77.5950)),
        );
        let event = DensityEvent::Init { locations };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "init");
        assert_eq!(json["locations"]["library"]["name"], "Library");
        assert_eq!(event.location(), None);
    }
}
