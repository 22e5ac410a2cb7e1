//! Cache-aside proxy over an upstream lookup source.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use geoproxy_core::constants::default_cache_ttl;
use geoproxy_core::error::{GeoError, Result};
use geoproxy_core::traits::{AddressLookup, LookupCache, MetricsRecorder};
use geoproxy_core::types::{CacheKey, LookupKind, LookupRequest, LookupResult};

/// Proxy configuration.
#[derive(Clone, Debug)]
pub struct ProxyConfig {
    /// Lifetime of every entry written back to the cache
    pub cache_ttl: Duration,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            cache_ttl: default_cache_ttl(),
        }
    }
}

impl ProxyConfig {
    /// Creates a config with the given TTL in seconds.
    pub fn with_ttl_seconds(seconds: u64) -> Self {
        Self {
            cache_ttl: Duration::from_secs(seconds),
        }
    }
}

/// Cache-aside lookup proxy.
///
/// Implements [`AddressLookup`] itself, so callers cannot tell whether a
/// result came from the cache or the upstream.
///
/// # Consistency
///
/// Hits are served without consulting the upstream and may be up to
/// [`ProxyConfig::cache_ttl`] stale. Concurrent misses for the same key are
/// not coalesced: each one calls the upstream and writes back, last write wins.
pub struct CacheAsideLookup {
    upstream: Arc<dyn AddressLookup>,
    cache: Arc<dyn LookupCache>,
    metrics: Arc<dyn MetricsRecorder>,
    config: ProxyConfig,
}

impl CacheAsideLookup {
    /// Creates a proxy from its collaborators.
    pub fn new(
        upstream: Arc<dyn AddressLookup>,
        cache: Arc<dyn LookupCache>,
        metrics: Arc<dyn MetricsRecorder>,
        config: ProxyConfig,
    ) -> Self {
        Self {
            upstream,
            cache,
            metrics,
            config,
        }
    }

    /// Returns the proxy configuration.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Reads and decodes a cached result.
    ///
    /// Misses, cache errors and undecodable payloads all come back as `None`.
    async fn read_cached(&self, kind: LookupKind, key: &CacheKey) -> Option<LookupResult> {
        let started = Instant::now();
        let read = self.cache.get(key).await;
        self.metrics.observe_cache(kind, started.elapsed());

        match read {
            Ok(Some(payload)) => match LookupResult::from_bytes(&payload) {
                Ok(result) => {
                    debug!(%key, "Cache hit");
                    Some(result)
                }
                Err(e) => {
                    warn!(%key, error = %e, "Discarding malformed cache entry");
                    None
                }
            },
            Ok(None) => {
                debug!(%key, "Cache miss");
                None
            }
            Err(e) => {
                warn!(%key, error = %e, "Cache read failed, falling through to upstream");
                None
            }
        }
    }

    /// Calls the upstream and normalises its failures.
    async fn fetch_upstream(&self, kind: LookupKind, request: &LookupRequest) -> Result<LookupResult> {
        let started = Instant::now();
        let outcome = self.upstream.lookup(request).await;
        self.metrics.observe_upstream(kind, started.elapsed());

        outcome.map_err(|e| match e {
            GeoError::NoResults => {
                debug!("Upstream found nothing");
                GeoError::NoResults
            }
            other => {
                warn!(error = %other, "Upstream lookup failed");
                other.into_upstream_unavailable()
            }
        })
    }

    /// Best-effort write-back. Failures are logged and swallowed.
    async fn write_back(&self, key: &CacheKey, result: &LookupResult) {
        let payload = match result.to_bytes() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(%key, error = %e, "Failed to encode lookup result for cache");
                return;
            }
        };

        match self.cache.set(key, payload, self.config.cache_ttl).await {
            Ok(()) => debug!(%key, ttl_secs = self.config.cache_ttl.as_secs(), "Cached lookup result"),
            Err(e) => warn!(%key, error = %e, "Failed to cache lookup result"),
        }
    }
}

#[async_trait]
impl AddressLookup for CacheAsideLookup {
    #[instrument(skip(self, request), fields(kind = %request.kind()))]
    async fn lookup(&self, request: &LookupRequest) -> Result<LookupResult> {
        let kind = request.kind();
        let key = request.cache_key();

        if let Some(cached) = self.read_cached(kind, &key).await {
            return Ok(cached);
        }

        let result = self.fetch_upstream(kind, request).await?;
        self.write_back(&key, &result).await;

        info!(%key, records = result.count(), "Resolved from upstream");
        Ok(result)
    }
}
