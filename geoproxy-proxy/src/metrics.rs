//! Prometheus timing histograms for the proxy.

use std::time::Duration;

use prometheus::{exponential_buckets, HistogramOpts, HistogramVec, Registry};

use geoproxy_core::error::{GeoError, Result};
use geoproxy_core::traits::MetricsRecorder;
use geoproxy_core::types::LookupKind;

/// Name of the cache read latency histogram.
pub const CACHE_DURATION_METRIC: &str = "geo_cache_duration_seconds";

/// Name of the upstream call latency histogram.
pub const UPSTREAM_DURATION_METRIC: &str = "geo_external_api_duration_seconds";

/// Latency histograms labelled by lookup kind (`method="Search"|"Geocode"`).
#[derive(Clone)]
pub struct PrometheusMetrics {
    cache_duration: HistogramVec,
    upstream_duration: HistogramVec,
}

impl PrometheusMetrics {
    /// Creates both histograms and registers them with `registry`.
    ///
    /// Fails if a collector with the same name is already registered.
    pub fn new(registry: &Registry) -> Result<Self> {
        let cache_duration = histogram(
            CACHE_DURATION_METRIC,
            "Duration of cache reads in seconds",
            0.001,
        )?;
        registry
            .register(Box::new(cache_duration.clone()))
            .map_err(metrics_error)?;

        let upstream_duration = histogram(
            UPSTREAM_DURATION_METRIC,
            "Duration of geocoding provider calls in seconds",
            0.01,
        )?;
        registry
            .register(Box::new(upstream_duration.clone()))
            .map_err(metrics_error)?;

        Ok(Self {
            cache_duration,
            upstream_duration,
        })
    }
}

impl MetricsRecorder for PrometheusMetrics {
    fn observe_cache(&self, kind: LookupKind, elapsed: Duration) {
        self.cache_duration
            .with_label_values(&[kind.as_str()])
            .observe(elapsed.as_secs_f64());
    }

    fn observe_upstream(&self, kind: LookupKind, elapsed: Duration) {
        self.upstream_duration
            .with_label_values(&[kind.as_str()])
            .observe(elapsed.as_secs_f64());
    }
}

/// 15 exponential buckets doubling from `start`.
fn histogram(name: &str, help: &str, start: f64) -> Result<HistogramVec> {
    let buckets = exponential_buckets(start, 2.0, 15).map_err(metrics_error)?;
    HistogramVec::new(HistogramOpts::new(name, help).buckets(buckets), &["method"])
        .map_err(metrics_error)
}

fn metrics_error(err: prometheus::Error) -> GeoError {
    GeoError::InternalError(format!("metrics: {err}"))
}
