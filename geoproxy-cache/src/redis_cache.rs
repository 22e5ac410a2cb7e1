//! Redis-backed lookup cache.
//!
//! Reads use `GET`, writes use `PSETEX` so sub-second TTLs are honoured.
//! Every round trip, including connecting, is bounded by
//! [`RedisConfig::timeout_ms`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use parking_lot::Mutex;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use geoproxy_core::constants::{DEFAULT_CACHE_TIMEOUT_MS, DEFAULT_REDIS_URL};
use geoproxy_core::error::{GeoError, Result};
use geoproxy_core::traits::LookupCache;
use geoproxy_core::types::CacheKey;

/// Redis cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Connection URL, e.g. `redis://127.0.0.1:6379/0`
    pub url: String,
    /// Deadline for one round trip, in milliseconds
    pub timeout_ms: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REDIS_URL.into(),
            timeout_ms: DEFAULT_CACHE_TIMEOUT_MS,
        }
    }
}

impl RedisConfig {
    /// Creates a config for the given URL with the default deadline.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the per-round-trip deadline.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Rejects a zero deadline, which would fail every round trip.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(GeoError::ConfigError("cache timeout must be positive".into()));
        }
        Ok(())
    }

    /// Returns the deadline as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Lookup cache stored in Redis.
///
/// The connection is opened on first use and reopened after a failed
/// attempt, so a Redis outage (including one at startup) only turns cache
/// operations into `Cache`/`Timeout` errors until the server is back.
/// Clones share one multiplexed connection.
#[derive(Clone)]
pub struct RedisLookupCache {
    client: redis::Client,
    connection: Arc<Mutex<Option<ConnectionManager>>>,
    config: RedisConfig,
}

impl RedisLookupCache {
    /// Creates a cache without touching the network.
    ///
    /// Fails with `ConfigError` for an unparseable URL or a zero deadline.
    pub fn new(config: RedisConfig) -> Result<Self> {
        config.validate()?;
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| GeoError::ConfigError(format!("invalid Redis URL: {e}")))?;

        Ok(Self {
            client,
            connection: Arc::new(Mutex::new(None)),
            config,
        })
    }

    /// Creates a cache and opens its connection eagerly.
    ///
    /// Fails with `Cache` or `Timeout` when the server cannot be reached in time.
    #[instrument(skip(config), fields(url = %config.url))]
    pub async fn connect(config: RedisConfig) -> Result<Self> {
        let cache = Self::new(config)?;
        cache.ensure_connected().await?;
        Ok(cache)
    }

    /// Opens the connection now if it is not open yet.
    pub async fn ensure_connected(&self) -> Result<()> {
        self.connection().await.map(|_| ())
    }

    /// Returns the configuration this cache was built with.
    pub fn config(&self) -> &RedisConfig {
        &self.config
    }

    /// Returns true once a connection has been established.
    pub fn is_connected(&self) -> bool {
        self.connection.lock().is_some()
    }

    /// Returns the shared connection, opening it if needed.
    ///
    /// Concurrent first uses may each open a connection; the last one stored wins.
    async fn connection(&self) -> Result<ConnectionManager> {
        let existing = self.connection.lock().clone();
        if let Some(conn) = existing {
            return Ok(conn);
        }

        let conn = bounded(
            self.config.timeout(),
            ConnectionManager::new(self.client.clone()),
        )
        .await
        .inspect_err(|e| warn!(url = %self.config.url, error = %e, "Redis connect failed"))?;

        info!(url = %self.config.url, "Connected to Redis cache");
        *self.connection.lock() = Some(conn.clone());
        Ok(conn)
    }
}

#[async_trait]
impl LookupCache for RedisLookupCache {
    #[instrument(skip(self, key), fields(key = %key))]
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;
        let payload: Option<Vec<u8>> = bounded(self.config.timeout(), conn.get(key.as_str())).await?;
        debug!(hit = payload.is_some(), "Redis GET");
        Ok(payload)
    }

    #[instrument(skip(self, key, payload), fields(key = %key, bytes = payload.len()))]
    async fn set(&self, key: &CacheKey, payload: Vec<u8>, ttl: Duration) -> Result<()> {
        let mut conn = self.connection().await?;
        let millis = ttl_millis(ttl);
        bounded(
            self.config.timeout(),
            conn.pset_ex::<_, _, ()>(key.as_str(), payload, millis),
        )
        .await?;
        debug!(ttl_ms = millis, "Redis PSETEX");
        Ok(())
    }
}

/// Runs a Redis future under the cache deadline, mapping both failure modes.
async fn bounded<T, F>(deadline: Duration, fut: F) -> Result<T>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(GeoError::Cache(e.to_string())),
        Err(_) => Err(GeoError::Timeout {
            stage: "cache",
            millis: deadline.as_millis() as u64,
        }),
    }
}

/// PSETEX rejects a zero expiry, so anything shorter than 1ms is clamped up.
fn ttl_millis(ttl: Duration) -> u64 {
    (ttl.as_millis() as u64).max(1)
}
