//! HTTP API: relay endpoints, health, metrics and the OpenAPI document.

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::{create_router, ApiDoc};
