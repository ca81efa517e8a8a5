//! The coordinating service that owns the location registry.
//!
//! [`DensityStore`] is shared by handle (`Arc`) between the transport
//! adapter and every simulation driver. It serializes all mutations
//! behind a single write lock so that mutate, sample, predict, and
//! publish run as one atomic step with respect to every other mutation.

use std::collections::BTreeMap;
use std::sync::Arc;

use crowd_types::{Coordinates, LocationRecord, LocationView};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::broadcast::{self, EventSink};
use crate::config::SeedLocation;
use crate::error::DensityError;
use crate::predictor;
use crate::registry::{CreateOutcome, LocationRegistry};

/// Shared, lock-protected location state plus its event sink.
pub struct DensityStore {
    registry: RwLock<LocationRegistry>,
    sink: Arc<dyn EventSink>,
}

impl core::fmt::Debug for DensityStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DensityStore").finish_non_exhaustive()
    }
}

impl DensityStore {
    /// Create a store around an existing registry.
    pub fn new(registry: LocationRegistry, sink: Arc<dyn EventSink>) -> Self {
        Self {
            registry: RwLock::new(registry),
            sink,
        }
    }

    /// Create a store pre-populated with the given seed locations.
    ///
    /// Seeding does not publish anything; subscribers see seeds in their
    /// initial snapshot.
    ///
    /// # Errors
    ///
    /// Returns the first [`DensityError`] raised by an invalid seed.
    pub fn seeded(seeds: &[SeedLocation], sink: Arc<dyn EventSink>) -> Result<Self, DensityError> {
        let mut registry = LocationRegistry::new();
        for seed in seeds {
            registry.insert(&seed.key, &seed.name, Coordinates(seed.lat, seed.lng))?;
        }
        info!(locations = registry.len(), "Location registry seeded");
        Ok(Self::new(registry, sink))
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Clone of every record keyed by location key.
    pub async fn snapshot(&self) -> BTreeMap<String, LocationRecord> {
        self.registry.read().await.list_all().clone()
    }

    /// Take a snapshot and run `f` under the same read lock.
    ///
    /// No mutation can land between the snapshot and `f`. The transport
    /// uses this to subscribe a new client so that every update not in
    /// its snapshot reaches its subscription.
    pub async fn snapshot_and<R>(
        &self,
        f: impl FnOnce() -> R,
    ) -> (BTreeMap<String, LocationRecord>, R) {
        let registry = self.registry.read().await;
        let result = f();
        (registry.list_all().clone(), result)
    }

    /// Clone of a single record.
    pub async fn get(&self, key: &str) -> Option<LocationRecord> {
        self.registry.read().await.get(key).cloned()
    }

    /// Registered location keys in order.
    pub async fn keys(&self) -> Vec<String> {
        self.registry.read().await.list_all().keys().cloned().collect()
    }

    /// A record together with its occupancy, forecast, and crowd level.
    ///
    /// # Errors
    ///
    /// Returns [`DensityError::UnknownLocation`] if `key` is not registered.
    pub async fn location(&self, key: &str) -> Result<LocationView, DensityError> {
        let registry = self.registry.read().await;
        let record = registry
            .get(key)
            .ok_or_else(|| DensityError::UnknownLocation(key.to_owned()))?;
        Ok(LocationView {
            location: key.to_owned(),
            occupancy: record.occupancy(),
            prediction: predictor::predict_next(record),
            level: record.level(),
            data: record.clone(),
        })
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Record a Wi-Fi-derived occupancy estimate.
    ///
    /// # Errors
    ///
    /// Returns [`DensityError::UnknownLocation`] if `key` is not registered.
    pub async fn report_wifi(&self, key: &str, count: u32) -> Result<(), DensityError> {
        self.apply(key, |registry| registry.set_wifi_count(key, count))
            .await?;
        debug!(location = key, count, "Wi-Fi count reported");
        Ok(())
    }

    /// Record a single check-in.
    ///
    /// # Errors
    ///
    /// Returns [`DensityError::UnknownLocation`] if `key` is not registered.
    pub async fn report_check_in(&self, key: &str) -> Result<(), DensityError> {
        self.adjust_check_ins(key, 1).await?;
        debug!(location = key, "Check-in reported");
        Ok(())
    }

    /// Record a manually reported density.
    ///
    /// # Errors
    ///
    /// Returns [`DensityError::UnknownLocation`] if `key` is not registered.
    pub async fn report_manual(&self, key: &str, density: u32) -> Result<(), DensityError> {
        self.apply(key, |registry| registry.set_manual(key, density))
            .await?;
        debug!(location = key, density, "Manual density reported");
        Ok(())
    }

    /// Shift the check-in count by `delta`, never going below zero.
    ///
    /// Returns the check-in count after the change.
    ///
    /// # Errors
    ///
    /// Returns [`DensityError::UnknownLocation`] if `key` is not registered.
    pub async fn adjust_check_ins(&self, key: &str, delta: i64) -> Result<u32, DensityError> {
        let mut registry = self.registry.write().await;
        registry.increment_check_ins(key, delta)?;
        broadcast::publish(self.sink.as_ref(), &registry, key);
        Ok(registry.get(key).map_or(0, |record| record.check_ins))
    }

    /// Register a new location keyed by its name.
    ///
    /// A duplicate name is a successful no-op.
    ///
    /// # Errors
    ///
    /// Returns [`DensityError::MissingFields`] for a blank name and
    /// [`DensityError::InvalidCoordinates`] for out-of-range coordinates.
    pub async fn add_location(
        &self,
        name: &str,
        lat: f64,
        lng: f64,
    ) -> Result<CreateOutcome, DensityError> {
        let outcome = self
            .registry
            .write()
            .await
            .create(name, Coordinates(lat, lng))?;
        match outcome {
            CreateOutcome::Created => info!(location = name, lat, lng, "Location added"),
            CreateOutcome::AlreadyExists => {
                debug!(location = name, "Location already registered, ignoring");
            }
        }
        Ok(outcome)
    }

    /// Run a registry mutation and publish its result under one write lock.
    async fn apply(
        &self,
        key: &str,
        mutation: impl FnOnce(&mut LocationRegistry) -> Result<(), DensityError>,
    ) -> Result<(), DensityError> {
        let mut registry = self.registry.write().await;
        mutation(&mut registry)?;
        broadcast::publish(self.sink.as_ref(), &registry, key);
        Ok(())
    }
}
