//! App state: config, the lookup pipeline and the metrics registry.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use prometheus::Registry;
use tracing::{info, warn};

use geoproxy_cache::{MemoryLookupCache, RedisConfig, RedisLookupCache};
use geoproxy_core::constants::DEFAULT_CACHE_TTL_SECONDS;
use geoproxy_core::error::{GeoError, Result};
use geoproxy_core::traits::{AddressLookup, LookupCache};
use geoproxy_proxy::{CacheAsideLookup, PrometheusMetrics, ProxyConfig};
use geoproxy_upstream::{DaDataClient, UpstreamConfig};

use crate::metrics::RequestMetrics;

/// Which store backs the lookup cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CacheBackend {
    /// Shared Redis instance
    #[default]
    Redis,
    /// Process-local map; nothing survives a restart
    Memory,
}

impl FromStr for CacheBackend {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(CacheBackend::Redis),
            "memory" | "mem" => Ok(CacheBackend::Memory),
            other => Err(GeoError::ConfigError(format!(
                "unknown cache backend '{other}', expected 'redis' or 'memory'"
            ))),
        }
    }
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CacheBackend::Redis => "redis",
            CacheBackend::Memory => "memory",
        })
    }
}

/// Server configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Provider client settings
    pub upstream: UpstreamConfig,
    /// Cache store selection
    pub cache_backend: CacheBackend,
    /// Redis settings, used when `cache_backend` is `Redis`
    pub redis: RedisConfig,
    /// Lifetime of cached results
    pub cache_ttl_seconds: u64,
}

impl AppConfig {
    /// Creates a config with defaults for everything but the API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            upstream: UpstreamConfig::new(api_key),
            cache_backend: CacheBackend::default(),
            redis: RedisConfig::default(),
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
        }
    }

    /// Reads the config from the environment, loading `.env` first if present.
    ///
    /// Unset variables keep their defaults; set but unparseable ones are an error.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Self::new(env::var("DADATA_API_KEY").unwrap_or_default());

        if let Some(url) = env_var("DADATA_SEARCH_URL") {
            config.upstream.search_url = url;
        }
        if let Some(url) = env_var("DADATA_GEOCODE_URL") {
            config.upstream.geocode_url = url;
        }
        if let Some(secs) = parse_env("UPSTREAM_TIMEOUT_SECONDS")? {
            config.upstream.timeout_seconds = secs;
        }
        if let Some(n) = parse_env("UPSTREAM_MAX_RESULTS")? {
            config.upstream.max_results = Some(n);
        }
        if let Some(backend) = parse_env("CACHE_BACKEND")? {
            config.cache_backend = backend;
        }
        if let Some(url) = env_var("REDIS_URL") {
            config.redis.url = url;
        }
        if let Some(ms) = parse_env("CACHE_TIMEOUT_MS")? {
            config.redis.timeout_ms = ms;
        }
        if let Some(secs) = parse_env("CACHE_TTL_SECONDS")? {
            config.cache_ttl_seconds = secs;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks cache settings. Upstream settings are checked when the client is built.
    pub fn validate(&self) -> Result<()> {
        if self.cache_ttl_seconds == 0 {
            return Err(GeoError::ConfigError("cache TTL must be positive".into()));
        }
        self.redis.validate()
    }

    /// Proxy settings derived from this config.
    pub fn proxy_config(&self) -> ProxyConfig {
        ProxyConfig::with_ttl_seconds(self.cache_ttl_seconds)
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env_var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| GeoError::ConfigError(format!("invalid {name} '{raw}': {e}"))),
        None => Ok(None),
    }
}

/// Shared state handed to every handler.
pub struct AppState {
    /// Configuration the state was built from
    pub config: AppConfig,
    /// The cache-aside lookup pipeline
    pub lookup: Arc<dyn AddressLookup>,
    /// Registry rendered by `GET /metrics`
    pub registry: Registry,
    /// Per-endpoint request count and latency
    pub requests: RequestMetrics,
    /// Redis handle when the Redis backend is in use, for health reporting
    pub redis: Option<RedisLookupCache>,
    /// When the state was built
    pub started_at: Instant,
}

impl AppState {
    /// Wires the provider client, cache and metrics into a cache-aside proxy.
    ///
    /// An unreachable Redis does not stop startup: the cache keeps retrying
    /// the connection on use and lookups go upstream until it succeeds.
    pub async fn build(config: AppConfig) -> Result<Self> {
        config.validate()?;
        let upstream = Arc::new(DaDataClient::with_config(config.upstream.clone())?);

        let (cache, redis): (Arc<dyn LookupCache>, _) = match config.cache_backend {
            CacheBackend::Redis => {
                let redis = RedisLookupCache::new(config.redis.clone())?;
                if let Err(e) = redis.ensure_connected().await {
                    warn!(
                        error = %e,
                        url = %config.redis.url,
                        "Redis unreachable, lookups go upstream until it is back"
                    );
                }
                (Arc::new(redis.clone()), Some(redis))
            }
            CacheBackend::Memory => (Arc::new(MemoryLookupCache::new()), None),
        };

        let registry = Registry::new();
        let metrics = Arc::new(PrometheusMetrics::new(&registry)?);
        let requests = RequestMetrics::new(&registry)?;
        let lookup = Arc::new(CacheAsideLookup::new(
            upstream,
            cache,
            metrics,
            config.proxy_config(),
        ));

        info!(
            backend = %config.cache_backend,
            ttl_secs = config.cache_ttl_seconds,
            "Lookup pipeline ready"
        );

        Ok(Self {
            config,
            lookup,
            registry,
            requests,
            redis,
            started_at: Instant::now(),
        })
    }

    /// Assembles state from a prebuilt lookup pipeline.
    ///
    /// Request metrics are registered into `registry`; the cache is reported
    /// as `config.cache_backend`.
    pub fn from_parts(
        config: AppConfig,
        lookup: Arc<dyn AddressLookup>,
        registry: Registry,
    ) -> Result<Self> {
        let requests = RequestMetrics::new(&registry)?;
        Ok(Self {
            config,
            lookup,
            registry,
            requests,
            redis: None,
            started_at: Instant::now(),
        })
    }

    /// Whether the cache store is currently reachable.
    pub fn cache_connected(&self) -> bool {
        self.redis.as_ref().map_or(true, RedisLookupCache::is_connected)
    }
}
