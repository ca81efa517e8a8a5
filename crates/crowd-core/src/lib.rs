//! State store, forecasting, and live sync for the crowd-density dashboard.
//!
//! This crate owns the per-location occupancy counters and everything
//! derived from them. Every mutation follows the same atomic sequence:
//! mutate the counter, append an occupancy sample, compute the forecast,
//! and publish an update event to subscribers.
//!
//! # Modules
//!
//! - [`registry`] -- [`LocationRegistry`], the key-to-record map.
//! - [`history`] -- Bounded occupancy history with FIFO eviction.
//! - [`predictor`] -- Moving-average forecast over recent samples.
//! - [`broadcast`] -- [`EventSink`] trait and update event assembly.
//! - [`store`] -- [`DensityStore`], the coordinating service that
//!   serializes mutations and publishes them.
//! - [`simulation`] -- Background drivers that emulate crowd flow.
//! - [`config`] -- Configuration loading from `crowd-config.yaml`.
//! - [`error`] -- [`DensityError`].
//!
//! [`LocationRegistry`]: registry::LocationRegistry
//! [`EventSink`]: broadcast::EventSink
//! [`DensityStore`]: store::DensityStore
//! [`DensityError`]: error::DensityError

pub mod broadcast;
pub mod config;
pub mod error;
pub mod history;
pub mod predictor;
pub mod registry;
pub mod simulation;
pub mod store;

pub use broadcast::EventSink;
pub use error::DensityError;
pub use registry::{CreateOutcome, LocationRegistry};
pub use store::DensityStore;
