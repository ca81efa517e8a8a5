//! Error types for the `crowd-core` crate.
//!
//! All fallible store operations return [`DensityError`]. None of these
//! are fatal to the process; they are reported back to the caller.

/// Errors that can occur when querying or mutating the location registry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DensityError {
    /// The targeted location key is not in the registry.
    #[error("unknown location: {0}")]
    UnknownLocation(String),

    /// A required request field was absent or empty.
    #[error("missing field: {0}")]
    MissingFields(&'static str),

    /// Coordinates were not finite or out of geographic range.
    #[error("invalid coordinates: lat {lat}, lng {lng}")]
    InvalidCoordinates {
        /// The rejected latitude.
        lat: f64,
        /// The rejected longitude.
        lng: f64,
    },
}
