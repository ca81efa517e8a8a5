//! Axum router construction for the dashboard API.
//!
//! Assembles all routes (HTTP + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled so the map client can be served from
//! any origin.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the dashboard server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws` -- `WebSocket` snapshot + update stream
/// - `GET /locations` -- registry snapshot
/// - `GET /locations/{key}` -- single location detail
/// - `POST /updateWifi`, `/checkin`, `/manual`, `/addLocation` -- reports
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws", get(ws::ws_updates))
        // Queries
        .route("/locations", get(handlers::list_locations))
        .route("/locations/{key}", get(handlers::get_location))
        // Reports
        .route("/updateWifi", post(handlers::update_wifi))
        .route("/checkin", post(handlers::check_in))
        .route("/manual", post(handlers::report_manual))
        .route("/addLocation", post(handlers::add_location))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
