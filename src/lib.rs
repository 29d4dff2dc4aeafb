//! HTTP relay for current weather and live traffic by coordinate.
//!
//! Two read-only endpoints forward a latitude/longitude pair to a third-party
//! provider and hand back the provider's JSON unmodified:
//!
//! ```text
//! GET /weather?lat=51.5&lon=-0.12  ->  OpenWeather  /data/2.5/weather
//! GET /traffic?lat=51.5&lon=-0.12  ->  TomTom       /flowSegmentData/...
//! ```
//!
//! Each request makes exactly one outbound call, bounded by a timeout. A
//! provider status other than 200 is returned to the caller as-is, with the
//! provider's raw body as the error detail. Nothing is retried or cached.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`provider`]: Provider endpoints and the outbound client
//! - [`api`]: HTTP API, health, metrics and OpenAPI document
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod provider;
pub mod utils;

pub use config::Config;
pub use error::{ConfigError, RelayError, Result};
