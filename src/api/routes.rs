//! HTTP API route definitions.

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ErrorDetail;

use super::handlers::{self, healthz, prometheus_metrics, traffic, weather, AppState};

/// Public API schema. Covers the relay endpoints only.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Weather & Traffic MCP",
        version = "1.0.0",
        description = "Fetch current weather (OpenWeather) and live traffic (TomTom) by lat/lon"
    ),
    servers((url = "http://localhost:8000")),
    paths(handlers::weather, handlers::traffic),
    components(schemas(ErrorDetail)),
    tags((name = "relay", description = "Provider pass-through endpoints"))
)]
pub struct ApiDoc;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Relay endpoints
        .route("/weather", get(weather))
        .route("/traffic", get(traffic))
        // Operational endpoints
        .route("/healthz", get(healthz))
        .route("/metrics", get(prometheus_metrics))
        // Schema and docs
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
