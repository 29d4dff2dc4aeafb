//! HTTP API handlers.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

use crate::error::{ErrorDetail, RelayError};
use crate::metrics::{self, OUTCOME_OK};
use crate::provider::{Coordinate, Provider, RelayClient};

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Provider client, credentials included. Read-only after startup.
    pub client: Arc<RelayClient>,
    /// Prometheus handle, present when the binary installed a recorder.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state.
    pub fn new(client: RelayClient) -> Self {
        Self {
            client: Arc::new(client),
            metrics: None,
        }
    }

    /// Attach the Prometheus handle rendered at `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Get current weather
///
/// Current conditions from OpenWeather for the coordinate, in metric units.
/// The provider's JSON is returned unmodified.
#[utoipa::path(
    get,
    path = "/weather",
    tag = "relay",
    params(Coordinate),
    responses(
        (status = 200, description = "OpenWeather response, unmodified", body = serde_json::Value),
        (status = 422, description = "Missing or non-numeric lat/lon", body = ErrorDetail),
        (status = 502, description = "Provider unreachable or returned non-JSON", body = ErrorDetail),
        (status = 504, description = "Provider did not respond in time", body = ErrorDetail),
        (status = "default", description = "Provider status passed through, raw provider body as detail", body = ErrorDetail),
    )
)]
pub async fn weather(
    State(state): State<AppState>,
    query: Result<Query<Coordinate>, QueryRejection>,
) -> Result<Response, RelayError> {
    relay(&state, Provider::Weather, query).await
}

/// Get live traffic flow
///
/// TomTom flow segment data for the road nearest to the coordinate.
/// The provider's JSON is returned unmodified.
#[utoipa::path(
    get,
    path = "/traffic",
    tag = "relay",
    params(Coordinate),
    responses(
        (status = 200, description = "TomTom response, unmodified", body = serde_json::Value),
        (status = 422, description = "Missing or non-numeric lat/lon", body = ErrorDetail),
        (status = 502, description = "Provider unreachable or returned non-JSON", body = ErrorDetail),
        (status = 504, description = "Provider did not respond in time", body = ErrorDetail),
        (status = "default", description = "Provider status passed through, raw provider body as detail", body = ErrorDetail),
    )
)]
pub async fn traffic(
    State(state): State<AppState>,
    query: Result<Query<Coordinate>, QueryRejection>,
) -> Result<Response, RelayError> {
    relay(&state, Provider::Traffic, query).await
}

async fn relay(
    state: &AppState,
    provider: Provider,
    query: Result<Query<Coordinate>, QueryRejection>,
) -> Result<Response, RelayError> {
    let outcome = match query {
        Ok(Query(at)) => state.client.fetch(provider, at).await,
        Err(rejection) => Err(RelayError::InvalidQuery(rejection.body_text())),
    };

    match outcome {
        Ok(body) => {
            metrics::inc_relay_requests(provider, OUTCOME_OK);
            Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
        }
        Err(e) => {
            metrics::inc_relay_requests(provider, e.kind());
            Err(e)
        }
    }
}

/// Health check handler - always returns 200. Not part of the API schema.
pub async fn healthz() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Prometheus scrape endpoint - 404 when no recorder is installed.
pub async fn prometheus_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
