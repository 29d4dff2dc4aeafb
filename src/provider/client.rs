//! HTTP client shared by both relay handlers.

use axum::body::Bytes;
use reqwest::StatusCode;
use serde::de::IgnoredAny;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::RelayError;
use crate::metrics;

use super::{Coordinate, Endpoint, Provider, TrafficEndpoint, WeatherEndpoint};

/// Forwards coordinates to the weather and traffic providers.
#[derive(Clone)]
pub struct RelayClient {
    /// HTTP client for provider requests.
    http: reqwest::Client,
    weather: WeatherEndpoint,
    traffic: TrafficEndpoint,
    /// Per-request timeout, kept for error reporting.
    timeout_ms: u64,
}

impl RelayClient {
    /// Create a client from config.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            // Covers connect, headers and body; a hung provider fails here
            .timeout(config.upstream_timeout())
            .danger_accept_invalid_certs(config.insecure_skip_tls_verify)
            .build()?;

        Ok(Self {
            http,
            weather: WeatherEndpoint::from_config(config),
            traffic: TrafficEndpoint::from_config(config),
            timeout_ms: config.upstream_timeout_ms,
        })
    }

    fn endpoint(&self, provider: Provider) -> &dyn Endpoint {
        match provider {
            Provider::Weather => &self.weather,
            Provider::Traffic => &self.traffic,
        }
    }

    /// Issue one GET to `provider` for `at` and return the JSON body as
    /// received.
    ///
    /// Any status other than 200 becomes [`RelayError::Upstream`] carrying the
    /// provider's status and raw body. Nothing is retried.
    #[instrument(skip(self), fields(provider = %provider))]
    pub async fn fetch(&self, provider: Provider, at: Coordinate) -> Result<Bytes, RelayError> {
        let endpoint = self.endpoint(provider);
        let _timer = metrics::timer_upstream(provider);

        let response = self
            .http
            .get(endpoint.url())
            .query(&endpoint.query(at))
            .send()
            .await
            .map_err(|e| self.transport_error(provider, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .map_err(|e| self.transport_error(provider, e))?;
            warn!(status = status.as_u16(), "Provider returned an error");
            return Err(RelayError::Upstream {
                provider,
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(provider, e))?;

        serde_json::from_slice::<IgnoredAny>(&body).map_err(|e| RelayError::InvalidBody {
            provider,
            reason: e.to_string(),
        })?;

        debug!(bytes = body.len(), "Provider responded");
        Ok(body)
    }

    fn transport_error(&self, provider: Provider, err: reqwest::Error) -> RelayError {
        // The URL carries the credential in its query string
        let err = err.without_url();
        if err.is_timeout() {
            warn!(timeout_ms = self.timeout_ms, "Provider timed out");
            RelayError::Timeout {
                provider,
                timeout_ms: self.timeout_ms,
            }
        } else {
            warn!(error = %err, "Provider request failed");
            RelayError::Transport {
                provider,
                source: err,
            }
        }
    }
}
