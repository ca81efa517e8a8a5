//! Core entity structs for the crowd-density dashboard.
//!
//! Field names serialize in camelCase so the browser map client can read
//! records exactly as the server pushes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::CrowdLevel;

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// A latitude/longitude pair, serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Coordinates(pub f64, pub f64);

impl Coordinates {
    /// Latitude in degrees.
    pub const fn lat(self) -> f64 {
        self.0
    }

    /// Longitude in degrees.
    pub const fn lng(self) -> f64 {
        self.1
    }

    /// Whether both components are finite and within geographic range.
    pub fn is_valid(self) -> bool {
        self.0.is_finite()
            && self.1.is_finite()
            && (-90.0..=90.0).contains(&self.0)
            && (-180.0..=180.0).contains(&self.1)
    }
}

// ---------------------------------------------------------------------------
// LocationRecord
// ---------------------------------------------------------------------------

/// Occupancy counters and rolling history for one location.
///
/// Occupancy is never stored; it is always derived from the three
/// counters via [`LocationRecord::occupancy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct LocationRecord {
    /// Display name.
    pub name: String,
    /// Position on the map.
    pub coords: Coordinates,
    /// Last Wi-Fi-derived occupancy estimate.
    pub wifi_count: u32,
    /// Net active check-ins.
    pub check_ins: u32,
    /// Last manually reported density.
    pub manual: u32,
    /// Occupancy samples, oldest first.
    pub history: Vec<u32>,
    /// When the last mutation was applied.
    pub updated_at: Option<DateTime<Utc>>,
}

impl LocationRecord {
    /// Create a record with zeroed counters and an empty history.
    pub fn new(name: impl Into<String>, coords: Coordinates) -> Self {
        Self {
            name: name.into(),
            coords,
            wifi_count: 0,
            check_ins: 0,
            manual: 0,
            history: Vec::new(),
            updated_at: None,
        }
    }

    /// Current occupancy: Wi-Fi count plus check-ins plus manual reports.
    pub const fn occupancy(&self) -> u32 {
        self.wifi_count
            .saturating_add(self.check_ins)
            .saturating_add(self.manual)
    }

    /// Crowd level derived from the current occupancy.
    pub const fn level(&self) -> CrowdLevel {
        CrowdLevel::from_occupancy(self.occupancy())
    }
}

// ---------------------------------------------------------------------------
// LocationView
// ---------------------------------------------------------------------------

/// A single location together with its derived values.
///
/// Returned by the per-location detail query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LocationView {
    /// Registry key.
    pub location: String,
    /// The stored record.
    pub data: LocationRecord,
    /// Derived occupancy.
    pub occupancy: u32,
    /// Forecast for the next sample.
    pub prediction: u32,
    /// Crowd level for the current occupancy.
    pub level: CrowdLevel,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn occupancy_sums_all_counters() {
        let mut record = LocationRecord::new("Library", Coordinates(12.9725, 77.5950));
        record.wifi_count = 15;
        record.check_ins = 1;
        record.manual = 5;
        assert_eq!(record.occupancy(), 21);
        assert_eq!(record.level(), CrowdLevel::Moderate);
    }

    #[test]
    fn occupancy_saturates() {
        let mut record = LocationRecord::new("Stadium", Coordinates(0.0, 0.0));
        record.wifi_count = u32::MAX;
        record.check_ins = 3;
        assert_eq!(record.occupancy(), u32::MAX);
    }

    #[test]
    fn coordinates_range_check() {
        assert!(Coordinates(12.9719, 77.5946).is_valid());
        assert!(Coordinates(-90.0, 180.0).is_valid());
        assert!(!Coordinates(91.0, 0.0).is_valid());
        assert!(!Coordinates(0.0, -180.5).is_valid());
        assert!(!Coordinates(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn record_serializes_camel_case() {
        let record = LocationRecord::new("Canteen", Coordinates(12.971, 77.594));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["wifiCount"], 0);
        assert_eq!(json["checkIns"], 0);
        assert!(json["history"].as_array().unwrap().is_empty());
        assert!(json["coords"].is_array());
        assert!(json["updatedAt"].is_null());
    }
}
