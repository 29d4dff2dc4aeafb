//! TomTom flow segment endpoint.

use crate::config::Config;

use super::{Coordinate, Endpoint};

/// TomTom `flowSegmentData`. Takes the coordinate as one `point=lat,lon`
/// parameter rather than two fields.
#[derive(Clone)]
pub struct TrafficEndpoint {
    url: String,
    api_key: String,
}

impl TrafficEndpoint {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.tomtom_url, &config.tomtom_api_key)
    }
}

impl Endpoint for TrafficEndpoint {
    fn url(&self) -> &str {
        &self.url
    }

    fn query(&self, at: Coordinate) -> Vec<(&'static str, String)> {
        vec![
            ("point", format!("{},{}", at.lat, at.lon)),
            ("key", self.api_key.clone()),
        ]
    }
}
