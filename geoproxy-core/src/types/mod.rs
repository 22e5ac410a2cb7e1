//! Domain types for geoproxy.
//!
//! - [`AddressRecord`]: One candidate address returned by the provider
//! - [`LookupResult`]: Non-empty, rank-ordered list of records (the cached payload)
//! - [`LookupRequest`]: Forward text search or reverse coordinate lookup
//! - [`CacheKey`]: Namespaced key derived from a request

mod address;
mod request;

pub use address::*;
pub use request::*;
