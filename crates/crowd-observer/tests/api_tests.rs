//! Integration tests for the dashboard API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic, routing, and the
//! publish path into the broadcast sink without a live network connection.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use crowd_core::config::CrowdConfig;
use crowd_observer::router::build_router;
use crowd_observer::state::AppState;
use crowd_types::{CrowdLevel, DensityEvent};
use serde_json::{Value, json};
use tokio::sync::broadcast::error::RecvError;
use tower::ServiceExt;

fn make_test_state() -> Arc<AppState> {
    Arc::new(AppState::from_config(&CrowdConfig::default()).unwrap())
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(path: &str, body: &Value) -> Request<Body> {
    Request::post(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(state: &Arc<AppState>, request: Request<Body>) -> (StatusCode, Value) {
    let response = build_router(Arc::clone(state))
        .oneshot(request)
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// =========================================================================
// Queries
// =========================================================================

#[tokio::test]
async fn test_index_returns_html() {
    let state = make_test_state();
    let router = build_router(state);

    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/html"));
}

#[tokio::test]
async fn test_index_escapes_location_names() {
    let state = make_test_state();
    state
        .store
        .add_location("<script>", 12.97, 77.59)
        .await
        .unwrap();

    let response = build_router(state)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("<script>"));
}

#[tokio::test]
async fn test_index_renders_one_row_per_location() {
    let state = make_test_state();
    state.store.report_wifi("library", 35).await.unwrap();

    let response = build_router(state)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();

    assert_eq!(html.matches("<tr><td>").count(), 3);
    let high = format!(r#"<td style="color:{}">35</td>"#, CrowdLevel::High.color());
    assert!(html.contains(&high), "{html}");
    assert!(html.contains(r#"<a href="/locations/canteen">"#));
}

#[tokio::test]
async fn test_list_locations() {
    let state = make_test_state();
    let (status, json) = send(
        &state,
        Request::get("/locations").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_object().unwrap().len(), 3);
    assert_eq!(json["college"]["name"], "College Grounds");
    assert_eq!(json["library"]["wifiCount"], 0);
    assert!(json["canteen"]["history"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_get_location_detail() {
    let state = make_test_state();
    state.store.report_wifi("library", 12).await.unwrap();
    state.store.report_wifi("library", 20).await.unwrap();

    let (status, json) = send(
        &state,
        Request::get("/locations/library").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["location"], "library");
    assert_eq!(json["occupancy"], 20);
    assert_eq!(json["prediction"], 16);
    assert_eq!(json["level"], "moderate");
    assert_eq!(json["data"]["history"], json!([12, 20]));
}

#[tokio::test]
async fn test_get_location_not_found() {
    let state = make_test_state();
    let (status, json) = send(
        &state,
        Request::get("/locations/nowhere").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], 404);
}

// =========================================================================
// Reports
// =========================================================================

#[tokio::test]
async fn test_update_wifi() {
    let state = make_test_state();
    let (status, json) = send(
        &state,
        post_json("/updateWifi", &json!({ "location": "college", "count": 15 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    let record = state.store.get("college").await.unwrap();
    assert_eq!(record.wifi_count, 15);
    assert_eq!(record.history, vec![15]);
}

#[tokio::test]
async fn test_reports_accumulate_history() {
    let state = make_test_state();
    send(
        &state,
        post_json("/updateWifi", &json!({ "location": "college", "count": 15 })),
    )
    .await;
    send(&state, post_json("/checkin", &json!({ "location": "college" }))).await;
    send(
        &state,
        post_json("/manual", &json!({ "location": "college", "density": 5 })),
    )
    .await;

    let record = state.store.get("college").await.unwrap();
    assert_eq!(record.occupancy(), 21);
    assert_eq!(record.history, vec![15, 16, 21]);
}

#[tokio::test]
async fn test_checkin_increments_by_one() {
    let state = make_test_state();
    for _ in 0..3 {
        let (status, _) =
            send(&state, post_json("/checkin", &json!({ "location": "canteen" }))).await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(state.store.get("canteen").await.unwrap().check_ins, 3);
}

#[tokio::test]
async fn test_unknown_location_is_rejected() {
    let state = make_test_state();
    let before = state.store.snapshot().await;

    let (status, json) = send(
        &state,
        post_json("/updateWifi", &json!({ "location": "nowhere", "count": 5 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Unknown location: nowhere");
    assert_eq!(state.store.snapshot().await, before);
}

#[tokio::test]
async fn test_missing_count_is_rejected() {
    let state = make_test_state();
    let (status, json) =
        send(&state, post_json("/updateWifi", &json!({ "location": "college" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing fields: count");
}

#[tokio::test]
async fn test_negative_count_is_rejected() {
    let state = make_test_state();
    let (status, _) = send(
        &state,
        post_json("/manual", &json!({ "location": "college", "density": -4 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(state.store.get("college").await.unwrap().history.is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let state = make_test_state();
    let request = Request::post("/checkin")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = send(&state, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
}

// =========================================================================
// Add location
// =========================================================================

#[tokio::test]
async fn test_add_location() {
    let state = make_test_state();
    let (status, json) = send(
        &state,
        post_json(
            "/addLocation",
            &json!({ "name": "Sports Complex", "lat": 12.9731, "lng": 77.5962 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["created"], true);

    let (status, _) = send(
        &state,
        post_json("/manual", &json!({ "location": "Sports Complex", "density": 8 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.store.get("Sports Complex").await.unwrap().manual, 8);
}

#[tokio::test]
async fn test_add_existing_location_is_ignored() {
    let state = make_test_state();
    state.store.report_wifi("library", 9).await.unwrap();
    let before = state.store.get("library").await.unwrap();

    let (status, json) = send(
        &state,
        post_json("/addLocation", &json!({ "name": "library", "lat": 1.0, "lng": 2.0 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["created"], false);
    assert_eq!(state.store.get("library").await.unwrap(), before);
}

#[tokio::test]
async fn test_add_location_missing_fields() {
    let state = make_test_state();
    let (status, json) = send(
        &state,
        post_json("/addLocation", &json!({ "name": "Quad", "lat": 12.97 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing fields: lng");

    let (status, _) = send(
        &state,
        post_json("/addLocation", &json!({ "name": "", "lat": 12.97, "lng": 77.59 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(state.store.snapshot().await.len(), 3);
}

#[tokio::test]
async fn test_add_location_invalid_coordinates() {
    let state = make_test_state();
    let (status, _) = send(
        &state,
        post_json("/addLocation", &json!({ "name": "Moon", "lat": 190.0, "lng": 0.0 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(state.store.get("Moon").await.is_none());
}

// =========================================================================
// Live updates
// =========================================================================

#[tokio::test]
async fn test_report_publishes_update() {
    let state = make_test_state();
    let mut rx = state.subscribe();

    send(
        &state,
        post_json("/updateWifi", &json!({ "location": "college", "count": 7 })),
    )
    .await;

    match rx.recv().await.unwrap() {
        DensityEvent::Update {
            location,
            data,
            prediction,
        } => {
            assert_eq!(location, "college");
            assert_eq!(data.history, vec![7]);
            assert_eq!(prediction, 7);
        }
        DensityEvent::Init { .. } => panic!("snapshots are never broadcast"),
    }
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_rejected_report_publishes_nothing() {
    let state = make_test_state();
    let mut rx = state.subscribe();

    send(
        &state,
        post_json("/checkin", &json!({ "location": "nowhere" })),
    )
    .await;

    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_snapshot_then_updates() {
    let state = make_test_state();
    state.store.report_manual("canteen", 2).await.unwrap();

    let (snapshot, mut rx) = state.store.snapshot_and(|| state.subscribe()).await;
    assert_eq!(snapshot.get("canteen").unwrap().history, vec![2]);

    state.store.report_check_in("canteen").await.unwrap();
    match rx.recv().await.unwrap() {
        DensityEvent::Update { data, .. } => assert_eq!(data.history, vec![2, 3]),
        DensityEvent::Init { .. } => panic!("unexpected snapshot"),
    }
}

#[tokio::test]
async fn test_broadcast_without_subscribers_is_not_an_error() {
    let state = make_test_state();
    assert_eq!(state.sink.receiver_count(), 0);
    state.store.report_wifi("library", 3).await.unwrap();
    assert_eq!(state.store.get("library").await.unwrap().history, vec![3]);
}

#[tokio::test]
async fn test_channel_capacity_comes_from_config() {
    let config = CrowdConfig {
        broadcast_capacity: 2,
        ..CrowdConfig::default()
    };
    let state = AppState::from_config(&config).unwrap();
    let mut rx = state.subscribe();

    for count in 1..=3 {
        state.store.report_wifi("college", count).await.unwrap();
    }

    // Three events into a two-slot channel: the oldest is dropped.
    assert!(matches!(rx.recv().await, Err(RecvError::Lagged(1))));
    match rx.recv().await.unwrap() {
        DensityEvent::Update { data, .. } => assert_eq!(data.wifi_count, 2),
        DensityEvent::Init { .. } => panic!("snapshots are never broadcast"),
    }
}

#[tokio::test]
async fn test_nonexistent_route_returns_404() {
    let state = make_test_state();
    let router = build_router(state);

    let response = router
        .oneshot(
            Request::get("/api/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
