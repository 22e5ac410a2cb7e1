//! Per-endpoint request metrics.

use std::time::Duration;

use prometheus::{linear_buckets, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

use geoproxy_core::error::{GeoError, Result};

/// Name of the request counter.
pub const REQUESTS_TOTAL_METRIC: &str = "geo_requests_total";

/// Name of the request latency histogram.
pub const REQUEST_DURATION_METRIC: &str = "geo_request_duration_seconds";

/// Request count and latency labelled by `endpoint`.
#[derive(Clone)]
pub struct RequestMetrics {
    requests_total: IntCounterVec,
    request_duration: HistogramVec,
}

impl RequestMetrics {
    /// Creates both collectors and registers them with `registry`.
    pub fn new(registry: &Registry) -> Result<Self> {
        let requests_total = IntCounterVec::new(
            Opts::new(REQUESTS_TOTAL_METRIC, "Total number of HTTP requests"),
            &["endpoint"],
        )
        .map_err(metrics_error)?;
        registry
            .register(Box::new(requests_total.clone()))
            .map_err(metrics_error)?;

        let buckets = linear_buckets(0.01, 0.05, 20).map_err(metrics_error)?;
        let request_duration = HistogramVec::new(
            HistogramOpts::new(REQUEST_DURATION_METRIC, "Duration of HTTP requests in seconds")
                .buckets(buckets),
            &["endpoint"],
        )
        .map_err(metrics_error)?;
        registry
            .register(Box::new(request_duration.clone()))
            .map_err(metrics_error)?;

        Ok(Self {
            requests_total,
            request_duration,
        })
    }

    /// Counts one incoming request.
    pub fn record_request(&self, endpoint: &str) {
        self.requests_total.with_label_values(&[endpoint]).inc();
    }

    /// Records the latency of a successfully answered request.
    pub fn observe_duration(&self, endpoint: &str, elapsed: Duration) {
        self.request_duration
            .with_label_values(&[endpoint])
            .observe(elapsed.as_secs_f64());
    }
}

fn metrics_error(err: prometheus::Error) -> GeoError {
    GeoError::InternalError(format!("metrics: {err}"))
}
