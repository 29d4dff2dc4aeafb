//! Upstream providers and the client that calls them.
//!
//! Each provider is an [`Endpoint`]: a fixed URL plus the query encoding that
//! provider expects for a [`Coordinate`]. [`RelayClient`] issues exactly one
//! GET per call and never retries.

pub mod client;
pub mod traffic;
pub mod weather;

use serde::Deserialize;
use strum::{Display, IntoStaticStr};
use utoipa::IntoParams;

pub use client::RelayClient;
pub use traffic::TrafficEndpoint;
pub use weather::WeatherEndpoint;

/// Third-party service the relay forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Provider {
    /// OpenWeather current conditions.
    Weather,
    /// TomTom flow segment data.
    Traffic,
}

/// Latitude/longitude pair taken from the request query.
///
/// No range check: anything that parses as a float is forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Coordinate {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
}

impl Coordinate {
    /// Create a coordinate.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A provider URL and its query encoding.
pub trait Endpoint: Send + Sync {
    /// Absolute URL for the GET request.
    fn url(&self) -> &str;

    /// Query parameters for `at`, credential included.
    ///
    /// Coordinates use `f64`'s `Display`: `1.0` goes out as `1` and `1e-7` as
    /// `0.0000001`. Both providers accept either form.
    fn query(&self, at: Coordinate) -> Vec<(&'static str, String)>;
}
