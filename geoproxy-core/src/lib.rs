//! # GeoProxy Core
//!
//! Core types, errors, and traits shared by every geoproxy crate.
//!
//! - **Types**: [`AddressRecord`], [`LookupRequest`], [`LookupResult`] and the derived [`CacheKey`]
//! - **Errors**: The [`GeoError`] taxonomy separating "not found" from "service failure"
//! - **Constants**: Defaults for TTLs, deadlines and provider endpoints
//! - **Traits**: The [`AddressLookup`] capability plus the cache and metrics seams
//!
//! ## Example
//!
//! ```rust
//! use geoproxy_core::{AddressRecord, LookupRequest, LookupResult};
//!
//! let request = LookupRequest::text("Moscow, Tverskaya 1");
//! assert_eq!(request.cache_key().as_str(), "search:Moscow, Tverskaya 1");
//!
//! let result = LookupResult::new(vec![AddressRecord::new(
//!     "Tverskaya 1", "Moscow", "Russia", "55.76", "37.60",
//! )])
//! .unwrap();
//! let bytes = result.to_bytes().unwrap();
//! assert_eq!(LookupResult::from_bytes(&bytes).unwrap(), result);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{GeoError, Result};
pub use traits::*;
pub use types::*;
