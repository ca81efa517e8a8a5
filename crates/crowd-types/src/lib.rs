//! Shared type definitions for the crowd-density dashboard.
//!
//! This crate is the single source of truth for the records and events
//! that cross the wire between the server and the map clients. Types
//! defined here flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`enums`] -- Crowd level classification
//! - [`structs`] -- Location records, coordinates, detail views
//! - [`events`] -- Snapshot and update events pushed to subscribers

pub mod enums;
pub mod events;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::CrowdLevel;
pub use events::DensityEvent;
pub use structs::{Coordinates, LocationRecord, LocationView};
