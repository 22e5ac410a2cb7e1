//! # GeoProxy Cache-Aside Lookup
//!
//! [`CacheAsideLookup`] sits in front of any [`AddressLookup`](geoproxy_core::AddressLookup)
//! and answers repeated identical lookups from a [`LookupCache`](geoproxy_core::LookupCache):
//!
//! 1. Derive the namespaced cache key from the request
//! 2. Serve a well-formed cached payload without touching the upstream
//! 3. On a miss or any cache failure, call the upstream
//! 4. Write a successful result back with a fixed TTL; never cache `NoResults`
//!
//! A degraded cache only costs latency; it never fails a lookup.
//!
//! ## Example
//!
//! ```rust,ignore
//! let proxy = CacheAsideLookup::new(upstream, cache, metrics, ProxyConfig::default());
//! let result = proxy.lookup(&LookupRequest::text("Moscow, Tverskaya 1")).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod metrics;
mod proxy;

pub use metrics::{PrometheusMetrics, CACHE_DURATION_METRIC, UPSTREAM_DURATION_METRIC};
pub use proxy::{CacheAsideLookup, ProxyConfig};
