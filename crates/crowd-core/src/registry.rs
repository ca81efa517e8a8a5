//! The location registry: a map from location key to [`LocationRecord`].
//!
//! Every mutating operation applies its change, stamps the record, and
//! appends an occupancy sample before returning. Publishing the resulting
//! update is left to the caller (see [`crate::store::DensityStore`]),
//! which holds the registry lock across both steps.

use std::collections::BTreeMap;

use chrono::Utc;
use crowd_types::{Coordinates, LocationRecord};

use crate::error::DensityError;
use crate::history;

/// Result of a create request.
///
/// Creation is idempotent: a duplicate key is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// A new record was inserted.
    Created,
    /// A record with this key already existed and was left unchanged.
    AlreadyExists,
}

/// In-memory map of location key to record.
#[derive(Debug, Clone, Default)]
pub struct LocationRegistry {
    records: BTreeMap<String, LocationRecord>,
}

impl LocationRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    /// Look up a record by key.
    pub fn get(&self, key: &str) -> Option<&LocationRecord> {
        self.records.get(key)
    }

    /// All records keyed by location key.
    pub const fn list_all(&self) -> &BTreeMap<String, LocationRecord> {
        &self.records
    }

    /// Number of registered locations.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the registry has no locations.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Insert a record under `name`, using `name` as both key and display
    /// name.
    ///
    /// # Errors
    ///
    /// Returns [`DensityError::MissingFields`] for a blank name and
    /// [`DensityError::InvalidCoordinates`] for out-of-range coordinates.
    pub fn create(
        &mut self,
        name: &str,
        coords: Coordinates,
    ) -> Result<CreateOutcome, DensityError> {
        self.insert(name, name, coords)
    }

    /// Insert a record whose key differs from its display name.
    ///
    /// Used for seed locations such as `college` / "College Grounds".
    ///
    /// # Errors
    ///
    /// Same as [`LocationRegistry::create`].
    pub fn insert(
        &mut self,
        key: &str,
        name: &str,
        coords: Coordinates,
    ) -> Result<CreateOutcome, DensityError> {
        if key.trim().is_empty() || name.trim().is_empty() {
            return Err(DensityError::MissingFields("name"));
        }
        if !coords.is_valid() {
            return Err(DensityError::InvalidCoordinates {
                lat: coords.lat(),
                lng: coords.lng(),
            });
        }
        if self.records.contains_key(key) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        self.records
            .insert(key.to_owned(), LocationRecord::new(name, coords));
        Ok(CreateOutcome::Created)
    }

    /// Set the Wi-Fi-derived count and append a sample.
    ///
    /// # Errors
    ///
    /// Returns [`DensityError::UnknownLocation`] if `key` is not registered.
    pub fn set_wifi_count(&mut self, key: &str, value: u32) -> Result<(), DensityError> {
        self.mutate(key, |record| record.wifi_count = value)
    }

    /// Add `delta` to the check-in count, clamped to `[0, u32::MAX]`, and
    /// append a sample.
    ///
    /// # Errors
    ///
    /// Returns [`DensityError::UnknownLocation`] if `key` is not registered.
    pub fn increment_check_ins(&mut self, key: &str, delta: i64) -> Result<(), DensityError> {
        self.mutate(key, |record| {
            record.check_ins = clamp_to_u32(i64::from(record.check_ins).saturating_add(delta));
        })
    }

    /// Set the manually reported density and append a sample.
    ///
    /// # Errors
    ///
    /// Returns [`DensityError::UnknownLocation`] if `key` is not registered.
    pub fn set_manual(&mut self, key: &str, value: u32) -> Result<(), DensityError> {
        self.mutate(key, |record| record.manual = value)
    }

    fn mutate(
        &mut self,
        key: &str,
        apply: impl FnOnce(&mut LocationRecord),
    ) -> Result<(), DensityError> {
        let record = self
            .records
            .get_mut(key)
            .ok_or_else(|| DensityError::UnknownLocation(key.to_owned()))?;
        apply(record);
        record.updated_at = Some(Utc::now());
        history::add_sample(record);
        Ok(())
    }
}

fn clamp_to_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
