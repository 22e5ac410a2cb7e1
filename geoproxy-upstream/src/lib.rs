//! Upstream geocoding provider for geoproxy.
//!
//! Talks to the DaData suggestions API. One POST per lookup, no retries and no
//! caching: this crate is the source of truth that the proxy shields.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod dadata;

pub use dadata::{DaDataClient, UpstreamConfig};
