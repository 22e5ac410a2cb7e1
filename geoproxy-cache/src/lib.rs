//! Expiring caches for geoproxy lookup results.
//!
//! Two [`LookupCache`](geoproxy_core::LookupCache) backends:
//!
//! - **Memory**: In-process TTL store for development, tests and single-node runs
//! - **Redis**: Shared store reached over the network, every round trip deadline-bounded

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod memory;
mod redis_cache;

pub use memory::{CacheConfig, CacheStats, MemoryLookupCache};
pub use redis_cache::{RedisConfig, RedisLookupCache};
