//! Application configuration loaded from environment variables.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

/// OpenWeather current weather endpoint.
pub const OPENWEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// TomTom flow segment endpoint (absolute speeds, zoom 10).
pub const TOMTOM_URL: &str =
    "https://api.tomtom.com/traffic/services/4/flowSegmentData/absolute/10/json";

/// Application configuration loaded from environment variables.
#[derive(Clone, Deserialize)]
pub struct Config {
    // === Provider Credentials ===
    /// OpenWeather API key, sent as `appid`.
    pub openweather_api_key: String,

    /// TomTom API key, sent as `key`.
    pub tomtom_api_key: String,

    // === Server Configuration ===
    /// Interface the HTTP server binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    // === Upstream Configuration ===
    /// Timeout for a single provider call, covering connect and body.
    #[serde(default = "default_timeout_ms")]
    pub upstream_timeout_ms: u64,

    /// Accept invalid provider TLS certificates. Off unless explicitly set.
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,

    /// Weather provider endpoint.
    #[serde(default = "default_openweather_url")]
    pub openweather_url: String,

    /// Traffic provider endpoint.
    #[serde(default = "default_tomtom_url")]
    pub tomtom_url: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_openweather_url() -> String {
    OPENWEATHER_URL.to_string()
}

fn default_tomtom_url() -> String {
    TOMTOM_URL.to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    ///
    /// The returned config has already passed [`Config::validate`].
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config: Self = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from explicit `(NAME, value)` pairs instead of the
    /// process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let config: Self =
            envy::from_iter(vars.into_iter().map(|(k, v)| (k.into(), v.into())))?;
        config.validate()?;
        Ok(config)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.openweather_api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential("OPENWEATHER_API_KEY"));
        }

        if self.tomtom_api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential("TOMTOM_API_KEY"));
        }

        if self.upstream_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "UPSTREAM_TIMEOUT_MS must be greater than 0".to_string(),
            ));
        }

        check_endpoint("OPENWEATHER_URL", &self.openweather_url)?;
        check_endpoint("TOMTOM_URL", &self.tomtom_url)?;

        Ok(())
    }

    /// Timeout applied to every outbound provider call.
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }
}

fn check_endpoint(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::Invalid(format!("{name} is not a valid URL: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid(format!(
            "{name} must use http or https, got {other}"
        ))),
    }
}

/// Describe a secret without revealing it.
pub fn redact(secret: &str) -> String {
    format!("<redacted, {} chars>", secret.chars().count())
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("openweather_api_key", &redact(&self.openweather_api_key))
            .field("tomtom_api_key", &redact(&self.tomtom_api_key))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("upstream_timeout_ms", &self.upstream_timeout_ms)
            .field("insecure_skip_tls_verify", &self.insecure_skip_tls_verify)
            .field("openweather_url", &self.openweather_url)
            .field("tomtom_url", &self.tomtom_url)
            .finish()
    }
}
