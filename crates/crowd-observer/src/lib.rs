//! Dashboard API server for the crowd-density dashboard.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws`) that sends one full snapshot on
//!   connect, then every location update via [`tokio::sync::broadcast`]
//! - **Query endpoints** for the registry snapshot and single locations
//! - **Report endpoints** for Wi-Fi counts, check-ins, manual densities,
//!   and new locations, at the paths the map client already uses
//! - **Minimal HTML status page** (`GET /`) listing every location
//!
//! # Architecture
//!
//! All state lives in a [`DensityStore`] from `crowd-core`. The store
//! publishes update events through the [`BroadcastSink`] defined here,
//! which is this crate's implementation of the core's `EventSink` seam.
//! `WebSocket` clients that fall behind skip ahead to the newest update.
//!
//! [`DensityStore`]: crowd_core::DensityStore
//! [`BroadcastSink`]: state::BroadcastSink

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use startup::spawn_observer;
pub use state::{AppState, BroadcastSink};
