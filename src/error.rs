//! Unified error types for the relay.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::provider::Provider;

/// Startup configuration errors. Any of these aborts the process before the
/// server binds.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment could not be deserialized (missing or unparseable value).
    #[error("environment error: {0}")]
    Env(#[from] envy::Error),

    /// A provider credential is present but empty.
    #[error("{0} is set but empty")]
    MissingCredential(&'static str),

    /// Any other invalid setting.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors surfaced to callers of the relay endpoints.
#[derive(Error, Debug)]
pub enum RelayError {
    /// `lat`/`lon` missing or not numbers. Raised before any outbound call.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Provider answered with something other than 200.
    #[error("{provider} provider returned HTTP {status}")]
    Upstream {
        /// Which provider answered.
        provider: Provider,
        /// Provider status code, passed through to the caller.
        status: u16,
        /// Raw provider body, passed through as the error detail.
        body: String,
    },

    /// Provider did not answer within the configured timeout.
    #[error("{provider} provider did not respond within {timeout_ms}ms")]
    Timeout {
        /// Which provider timed out.
        provider: Provider,
        /// Configured timeout.
        timeout_ms: u64,
    },

    /// Connection or protocol failure talking to the provider.
    #[error("request to {provider} provider failed: {source}")]
    Transport {
        /// Which provider failed.
        provider: Provider,
        /// Underlying client error, with the request URL stripped.
        #[source]
        source: reqwest::Error,
    },

    /// Provider answered 200 with a body that is not JSON.
    #[error("{provider} provider returned a non-JSON body: {reason}")]
    InvalidBody {
        /// Which provider answered.
        provider: Provider,
        /// Parser message.
        reason: String,
    },
}

impl RelayError {
    /// HTTP status returned to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::InvalidQuery(_) => StatusCode::UNPROCESSABLE_ENTITY,
            RelayError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            RelayError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            RelayError::Transport { .. } | RelayError::InvalidBody { .. } => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    /// Value of the `detail` field in the error body.
    pub fn detail(&self) -> String {
        match self {
            RelayError::Upstream { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::InvalidQuery(_) => "invalid_query",
            RelayError::Upstream { .. } => "upstream_error",
            RelayError::Timeout { .. } => "timeout",
            RelayError::Transport { .. } => "transport_error",
            RelayError::InvalidBody { .. } => "invalid_body",
        }
    }
}

/// Error body returned by the relay endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ErrorDetail {
    /// Human readable reason, or the provider's raw response body.
    pub detail: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorDetail { detail: self.detail() })).into_response()
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, RelayError>;
