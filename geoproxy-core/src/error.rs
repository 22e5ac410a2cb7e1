//! Error types for geoproxy.
//!
//! The taxonomy keeps three outcomes apart all the way to the transport edge:
//! a negative lookup ([`GeoError::NoResults`]), an upstream failure
//! ([`GeoError::UpstreamUnavailable`] and the raw transport/decode errors it is
//! built from), and cache-layer failures that the proxy absorbs internally.

use thiserror::Error;

/// Result type alias using `GeoError`.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Main error type for all geoproxy operations.
#[derive(Debug, Error)]
pub enum GeoError {
    // ═══════════════════════════════════════════════════════════════════════════
    // LOOKUP OUTCOMES
    // ═══════════════════════════════════════════════════════════════════════════

    /// The provider found no candidate addresses. Never cached.
    #[error("no addresses found")]
    NoResults,

    /// The provider could not be reached or answered with garbage.
    #[error("upstream geocoder unavailable: {0}")]
    UpstreamUnavailable(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // UPSTREAM ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The HTTP call did not complete: connect failure, timeout or non-2xx status.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered, but the body could not be parsed.
    #[error("decode error: {0}")]
    Decode(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // CACHE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// A cache read or write failed.
    #[error("cache error: {0}")]
    Cache(String),

    /// A cache round trip did not finish within its deadline.
    #[error("{stage} round trip timed out after {millis}ms")]
    Timeout {
        /// Which stage ran out of time
        stage: &'static str,
        /// The deadline that was exceeded
        millis: u64,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Input validation failed.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Internal invariant violation (should never happen).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl GeoError {
    /// Returns true if this is the negative "nothing found" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GeoError::NoResults)
    }

    /// Returns true if this error came from talking to the provider.
    pub fn is_upstream_failure(&self) -> bool {
        matches!(
            self,
            GeoError::UpstreamUnavailable(_)
                | GeoError::Transport(_)
                | GeoError::Decode(_)
        )
    }

    /// Returns true if this error is recoverable (a later attempt may succeed).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GeoError::UpstreamUnavailable(_)
                | GeoError::Transport(_)
                | GeoError::Cache(_)
                | GeoError::Timeout { .. }
        )
    }

    /// Collapses any non-negative failure into [`GeoError::UpstreamUnavailable`].
    ///
    /// `NoResults` and an existing `UpstreamUnavailable` pass through untouched.
    pub fn into_upstream_unavailable(self) -> Self {
        match self {
            GeoError::NoResults => GeoError::NoResults,
            err @ GeoError::UpstreamUnavailable(_) => err,
            other => GeoError::UpstreamUnavailable(other.to_string()),
        }
    }
}
