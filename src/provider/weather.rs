//! OpenWeather current weather endpoint.

use crate::config::Config;

use super::{Coordinate, Endpoint};

/// Units requested from OpenWeather.
const UNITS: &str = "metric";

/// OpenWeather `/data/2.5/weather`.
#[derive(Clone)]
pub struct WeatherEndpoint {
    url: String,
    api_key: String,
}

impl WeatherEndpoint {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.openweather_url, &config.openweather_api_key)
    }
}

impl Endpoint for WeatherEndpoint {
    fn url(&self) -> &str {
        &self.url
    }

    fn query(&self, at: Coordinate) -> Vec<(&'static str, String)> {
        vec![
            ("lat", at.lat.to_string()),
            ("lon", at.lon.to_string()),
            ("appid", self.api_key.clone()),
            ("units", UNITS.to_string()),
        ]
    }
}
