//! Error types for the dashboard API layer.
//!
//! [`ObserverError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use crowd_core::DensityError;

/// Errors that can occur in the dashboard API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The core rejected a command.
    #[error(transparent)]
    Density(#[from] DensityError),

    /// The request body was not valid JSON of the expected shape.
    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

impl From<JsonRejection> for ObserverError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Density(DensityError::UnknownLocation(key)) => {
                (StatusCode::BAD_REQUEST, format!("Unknown location: {key}"))
            }
            Self::Density(DensityError::MissingFields(field)) => {
                (StatusCode::BAD_REQUEST, format!("Missing fields: {field}"))
            }
            Self::Density(e @ DensityError::InvalidCoordinates { .. }) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            Self::InvalidBody(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
