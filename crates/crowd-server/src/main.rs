//! Crowd-density dashboard binary.
//!
//! Wires the location store, the HTTP + `WebSocket` server, and the
//! per-location crowd-flow simulation together, then runs until Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `crowd-config.yaml`
//! 3. Build the broadcast sink and seed the location store
//! 4. Spawn the dashboard server on a background task
//! 5. Spawn one simulation driver per seed location
//! 6. Wait for Ctrl-C, then abort every task

mod error;

use std::path::Path;
use std::sync::Arc;

use crowd_core::config::CrowdConfig;
use crowd_core::simulation;
use crowd_observer::state::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Path of the configuration file, relative to the working directory.
const CONFIG_PATH: &str = "crowd-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, seeding, or server startup fails.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("crowd-server starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        host = config.server.host,
        port = config.server.port,
        locations = config.locations.len(),
        simulation = config.simulation.enabled,
        "Configuration loaded"
    );

    // 3. Build state.
    let state = Arc::new(AppState::from_config(&config)?);

    // 4. Start the dashboard server.
    let server = crowd_observer::spawn_observer(config.server.clone(), Arc::clone(&state))?;

    // 5. Start simulated crowd flow for the seed locations.
    let drivers = if config.simulation.enabled {
        let keys: Vec<String> = config.locations.iter().map(|l| l.key.clone()).collect();
        info!(
            drivers = keys.len(),
            startup_delay_ms = config.simulation.startup_delay_ms,
            "Starting simulation drivers"
        );
        simulation::spawn_drivers(&state.store, &keys, &config.simulation)
    } else {
        info!("Simulation disabled");
        Vec::new()
    };

    // 6. Run until interrupted.
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    for driver in &drivers {
        driver.abort();
    }
    server.abort();

    info!("crowd-server shutdown complete");
    Ok(())
}

/// Load configuration from [`CONFIG_PATH`], falling back to defaults.
fn load_config() -> Result<CrowdConfig, AppError> {
    let path = Path::new(CONFIG_PATH);
    if path.exists() {
        Ok(CrowdConfig::from_file(path)?)
    } else {
        info!("Config file not found, using defaults");
        let mut config = CrowdConfig::default();
        config.server.apply_env_overrides()?;
        Ok(config)
    }
}
