//! Common traits for geoproxy.
//!
//! These traits define the seams between the proxy and its collaborators, so
//! each can be swapped for an in-memory fake in tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{CacheKey, LookupKind, LookupRequest, LookupResult};

// ═══════════════════════════════════════════════════════════════════════════════
// LOOKUP CAPABILITY
// ═══════════════════════════════════════════════════════════════════════════════

/// Anything that can answer an address lookup.
///
/// Implemented by:
/// - The upstream provider client (the source of truth)
/// - The cache-aside proxy (wrapping any other `AddressLookup`)
/// - In-memory fakes in tests
#[async_trait]
pub trait AddressLookup: Send + Sync {
    /// Resolves a request to a non-empty, rank-ordered result.
    ///
    /// Fails with [`GeoError::NoResults`](crate::GeoError::NoResults) when
    /// nothing matched.
    async fn lookup(&self, request: &LookupRequest) -> Result<LookupResult>;
}

#[async_trait]
impl<T: AddressLookup + ?Sized> AddressLookup for Arc<T> {
    async fn lookup(&self, request: &LookupRequest) -> Result<LookupResult> {
        (**self).lookup(request).await
    }
}

#[async_trait]
impl<T: AddressLookup + ?Sized> AddressLookup for Box<T> {
    async fn lookup(&self, request: &LookupRequest) -> Result<LookupResult> {
        (**self).lookup(request).await
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE STORE
// ═══════════════════════════════════════════════════════════════════════════════

/// String-keyed byte store with per-entry expiry.
///
/// The store knows nothing about lookups; payloads are opaque bytes. An
/// expired entry must read as a miss (`Ok(None)`).
#[async_trait]
pub trait LookupCache: Send + Sync {
    /// Reads the payload stored under `key`, if present and unexpired.
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>>;

    /// Stores `payload` under `key`, replacing any previous entry, for `ttl`.
    async fn set(&self, key: &CacheKey, payload: Vec<u8>, ttl: Duration) -> Result<()>;
}

#[async_trait]
impl<T: LookupCache + ?Sized> LookupCache for Arc<T> {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &CacheKey, payload: Vec<u8>, ttl: Duration) -> Result<()> {
        (**self).set(key, payload, ttl).await
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// METRICS
// ═══════════════════════════════════════════════════════════════════════════════

/// Sink for timing observations.
pub trait MetricsRecorder: Send + Sync {
    /// Records how long a cache read took.
    fn observe_cache(&self, kind: LookupKind, elapsed: Duration);

    /// Records how long an upstream call took.
    fn observe_upstream(&self, kind: LookupKind, elapsed: Duration);
}

/// Recorder that drops every observation.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMetrics;

impl MetricsRecorder for NoopMetrics {
    fn observe_cache(&self, _kind: LookupKind, _elapsed: Duration) {}

    fn observe_upstream(&self, _kind: LookupKind, _elapsed: Duration) {}
}
