//! Error types for the dashboard binary.
//!
//! [`AppError`] is the top-level error type that wraps all possible
//! failure modes during startup.

/// Top-level error for the dashboard binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crowd_core::config::ConfigError,
    },

    /// A seed location was rejected by the registry.
    #[error("seed error: {source}")]
    Seed {
        /// The underlying registry error.
        #[from]
        source: crowd_core::DensityError,
    },

    /// The dashboard server failed to start.
    #[error("server error: {source}")]
    Server {
        /// The underlying startup error.
        #[from]
        source: crowd_observer::startup::StartupError,
    },

    /// Waiting for the shutdown signal failed.
    #[error("signal error: {source}")]
    Signal {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
