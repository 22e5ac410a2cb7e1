//! Service constants for geoproxy.
//!
//! Defaults mirror the values the service has always run with in production:
//! a five minute cache lifetime and the DaData suggestions endpoints.

use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE KEY NAMESPACES
// ═══════════════════════════════════════════════════════════════════════════════
// Every key is prefixed by the request variant so that a text query and a
// coordinate pair can never resolve to the same entry.

/// Namespace for forward (free-text) search keys.
pub const SEARCH_NAMESPACE: &str = "search";

/// Namespace for reverse geocoding keys.
pub const GEOCODE_NAMESPACE: &str = "geocode";

/// Separator between namespace and key fields.
pub const KEY_SEPARATOR: char = ':';

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default lifetime of a cached lookup result, in seconds.
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;

/// Default deadline for a single cache round trip, in milliseconds.
pub const DEFAULT_CACHE_TIMEOUT_MS: u64 = 500;

/// Default capacity of the in-process cache.
pub const DEFAULT_MEMORY_CACHE_ENTRIES: usize = 10_000;

/// Default Redis connection address.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

// ═══════════════════════════════════════════════════════════════════════════════
// UPSTREAM DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// DaData forward search endpoint.
pub const DEFAULT_SEARCH_URL: &str =
    "https://suggestions.dadata.ru/suggestions/api/4_1/rs/suggest/address";

/// DaData reverse geocoding endpoint.
pub const DEFAULT_GEOCODE_URL: &str =
    "https://suggestions.dadata.ru/suggestions/api/4_1/rs/geolocate/address";

/// Default deadline for a single upstream round trip, in seconds.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECONDS: u64 = 10;

/// Upper bound on results the provider will return per request.
pub const MAX_UPSTREAM_RESULTS: u32 = 20;

/// Returns the default cache TTL as a [`Duration`].
pub const fn default_cache_ttl() -> Duration {
    Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS)
}
