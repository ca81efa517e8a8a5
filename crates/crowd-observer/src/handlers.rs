//! HTTP endpoint handlers for the dashboard server.
//!
//! Report endpoints accept the JSON bodies the map client already sends.
//! Every field is optional at the serde level so that an absent field is
//! reported as `MissingFields` rather than a generic parse failure.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/locations` | Full registry snapshot |
//! | `GET` | `/locations/{key}` | One location with occupancy and forecast |
//! | `POST` | `/updateWifi` | `{location, count}` |
//! | `POST` | `/checkin` | `{location}` |
//! | `POST` | `/manual` | `{location, density}` |
//! | `POST` | `/addLocation` | `{name, lat, lng}` |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse};
use crowd_core::predictor;
use crowd_core::{CreateOutcome, DensityError};

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /updateWifi`.
#[derive(Debug, serde::Deserialize)]
pub struct WifiReport {
    /// Location key.
    pub location: Option<String>,
    /// Wi-Fi-derived occupancy estimate.
    pub count: Option<u32>,
}

/// Body of `POST /checkin`.
#[derive(Debug, serde::Deserialize)]
pub struct CheckInReport {
    /// Location key.
    pub location: Option<String>,
}

/// Body of `POST /manual`.
#[derive(Debug, serde::Deserialize)]
pub struct ManualReport {
    /// Location key.
    pub location: Option<String>,
    /// Manually observed density.
    pub density: Option<u32>,
}

/// Body of `POST /addLocation`.
#[derive(Debug, serde::Deserialize)]
pub struct NewLocation {
    /// Display name, also used as the key.
    pub name: Option<String>,
    /// Latitude in degrees.
    pub lat: Option<f64>,
    /// Longitude in degrees.
    pub lng: Option<f64>,
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ObserverError> {
    value.ok_or(ObserverError::Density(DensityError::MissingFields(field)))
}

fn success() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "success": true }))
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page listing every location and its crowd level.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let locations = state.store.snapshot().await;
    let subscribers = state.sink.receiver_count();

    let rows: String = locations
        .iter()
        .map(|(key, record)| {
            format!(
                r#"<tr><td><a href="/locations/{href}">{name}</a></td><td>{wifi}</td><td>{check_ins}</td><td>{manual}</td><td style="color:{color}">{occupancy}</td><td>{prediction}</td></tr>"#,
                href = escape_html(key),
                name = escape_html(&record.name),
                wifi = record.wifi_count,
                check_ins = record.check_ins,
                manual = record.manual,
                occupancy = record.occupancy(),
                prediction = predictor::predict_next(record),
                color = record.level().color(),
            )
        })
        .collect();
    let location_count = locations.len();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Crowd Density</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        table {{ border-collapse: collapse; width: 100%; }}
        th, td {{ border-bottom: 1px solid #30363d; padding: 0.4rem 0.6rem; text-align: left; }}
        th {{ color: #8b949e; font-weight: normal; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        .status {{ color: #3fb950; font-weight: bold; }}
    </style>
</head>
<body>
    <h1>Crowd Density</h1>
    <p class="subtitle">{location_count} locations, {subscribers} live subscribers</p>

    <p>Status: <span class="status">RUNNING</span></p>

    <table>
        <tr><th>Location</th><th>Wi-Fi</th><th>Check-ins</th><th>Manual</th><th>Current</th><th>Predicted</th></tr>
        {rows}
    </table>

    <h2>Live updates</h2>
    <p><code>ws://host:port/ws</code></p>
</body>
</html>"#
    ))
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Return every location keyed by location key.
pub async fn list_locations(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.store.snapshot().await)
}

/// Return one location with its occupancy, forecast, and crowd level.
pub async fn get_location(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    match state.store.location(&key).await {
        Ok(view) => Ok(Json(view)),
        Err(DensityError::UnknownLocation(key)) => {
            Err(ObserverError::NotFound(format!("location {key} not found")))
        }
        Err(e) => Err(e.into()),
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// `POST /updateWifi` -- set the Wi-Fi-derived count.
pub async fn update_wifi(
    State(state): State<Arc<AppState>>,
    body: Result<Json<WifiReport>, JsonRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Json(report) = body?;
    let location = required(report.location, "location")?;
    let count = required(report.count, "count")?;
    state.store.report_wifi(&location, count).await?;
    Ok(success())
}

/// `POST /checkin` -- record one check-in.
pub async fn check_in(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CheckInReport>, JsonRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Json(report) = body?;
    let location = required(report.location, "location")?;
    state.store.report_check_in(&location).await?;
    Ok(success())
}

/// `POST /manual` -- set the manually reported density.
pub async fn report_manual(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ManualReport>, JsonRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Json(report) = body?;
    let location = required(report.location, "location")?;
    let density = required(report.density, "density")?;
    state.store.report_manual(&location, density).await?;
    Ok(success())
}

/// `POST /addLocation` -- register a location picked on the map.
///
/// Adding a name that already exists succeeds without changing anything.
pub async fn add_location(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewLocation>, JsonRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Json(request) = body?;
    let name = required(request.name, "name")?;
    let lat = required(request.lat, "lat")?;
    let lng = required(request.lng, "lng")?;
    let outcome = state.store.add_location(&name, lat, lng).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "created": outcome == CreateOutcome::Created,
    })))
}
