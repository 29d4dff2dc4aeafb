//! Prometheus metrics for relay traffic and provider latency.

use std::time::{Duration, Instant};

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::provider::Provider;

// === Metric Name Constants ===

/// Relay requests counter metric name, labelled by provider and outcome.
pub const METRIC_RELAY_REQUESTS: &str = "relay_requests_total";
/// Provider call latency metric name, labelled by provider.
pub const METRIC_UPSTREAM_LATENCY: &str = "upstream_latency_ms";

/// How often histogram samples are folded into their summaries.
pub const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Outcome label for a request that returned the provider body.
pub const OUTCOME_OK: &str = "ok";

/// Initialize all metric descriptions.
pub fn init_metrics() {
    describe_counter!(
        METRIC_RELAY_REQUESTS,
        "Total relay requests by provider and outcome"
    );
    describe_histogram!(
        METRIC_UPSTREAM_LATENCY,
        "Provider call latency in milliseconds"
    );

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder, describe the relay metrics and
/// start its upkeep task.
///
/// Can only succeed once per process. Must be called inside a tokio runtime.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    spawn_upkeep(handle.clone(), UPKEEP_INTERVAL);
    Ok(handle)
}

/// Periodically drain buffered histogram samples.
///
/// Without this, samples only drain when `/metrics` is scraped and pile up in
/// memory otherwise.
pub fn spawn_upkeep(handle: PrometheusHandle, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            handle.run_upkeep();
        }
    })
}

/// Count one relay request.
pub fn inc_relay_requests(provider: Provider, outcome: &'static str) {
    let provider: &'static str = provider.into();
    counter!(METRIC_RELAY_REQUESTS, "provider" => provider, "outcome" => outcome).increment(1);
}

/// RAII guard for timing provider calls.
/// Records latency when dropped, including on error paths.
pub struct LatencyTimer {
    start: Instant,
    provider: &'static str,
}

impl LatencyTimer {
    /// Start timing a call to `provider`.
    pub fn new(provider: Provider) -> Self {
        Self {
            start: Instant::now(),
            provider: provider.into(),
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        histogram!(METRIC_UPSTREAM_LATENCY, "provider" => self.provider).record(self.elapsed_ms());
    }
}

/// Create a latency timer for a provider call.
pub fn timer_upstream(provider: Provider) -> LatencyTimer {
    LatencyTimer::new(provider)
}
