//! Enumeration types for the crowd-density dashboard.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Highest occupancy still considered [`CrowdLevel::Low`].
pub const LOW_MAX: u32 = 10;

/// Highest occupancy still considered [`CrowdLevel::Moderate`].
pub const MODERATE_MAX: u32 = 30;

/// Coarse classification of a location's occupancy.
///
/// The map client colours markers by this level: green, orange, red.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum CrowdLevel {
    /// Ten people or fewer.
    Low,
    /// Up to thirty people.
    Moderate,
    /// More than thirty people.
    High,
}

impl CrowdLevel {
    /// Classify an occupancy value.
    pub const fn from_occupancy(occupancy: u32) -> Self {
        if occupancy <= LOW_MAX {
            Self::Low
        } else if occupancy <= MODERATE_MAX {
            Self::Moderate
        } else {
            Self::High
        }
    }

    /// Marker colour used by the map client.
    pub const fn color(self) -> &'static str {
        match self {
            Self::Low => "green",
            Self::Moderate => "orange",
            Self::High => "red",
        }
    }
}
