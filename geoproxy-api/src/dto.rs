//! DTOs for API requests and responses.

use serde::{Deserialize, Serialize};

use geoproxy_core::types::{AddressRecord, LookupResult};

/// Request body for `POST /api/address/search`.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Free-form address text
    pub query: String,
}

/// Request body for `POST /api/address/geocode`.
///
/// Coordinates are decimal strings, forwarded to the provider as given.
#[derive(Debug, Deserialize)]
pub struct GeocodeRequest {
    /// Latitude
    pub lat: String,
    /// Longitude
    pub lng: String,
}

/// Response for both lookup endpoints, best match first.
#[derive(Debug, Serialize, Deserialize)]
pub struct AddressesResponse {
    /// Matching addresses in provider rank order
    pub addresses: Vec<AddressRecord>,
}

impl From<LookupResult> for AddressesResponse {
    fn from(result: LookupResult) -> Self {
        Self {
            addresses: result.into_records(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status
    pub status: String,
    /// Version
    pub version: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Cache backend in use
    pub cache_backend: String,
    /// Whether the cache store is reachable right now
    pub cache_connected: bool,
}
