//! Lookup requests and the cache keys derived from them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{GEOCODE_NAMESPACE, KEY_SEPARATOR, SEARCH_NAMESPACE};
use crate::error::{GeoError, Result};

/// Which kind of lookup a request performs.
///
/// Also the label under which cache and upstream timings are recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LookupKind {
    /// Forward search by free text
    Search,
    /// Reverse geocoding by coordinates
    Geocode,
}

impl LookupKind {
    /// Returns the operation name used for metrics labels.
    pub const fn as_str(self) -> &'static str {
        match self {
            LookupKind::Search => "Search",
            LookupKind::Geocode => "Geocode",
        }
    }

    /// Returns the cache key namespace for this kind.
    pub const fn namespace(self) -> &'static str {
        match self {
            LookupKind::Search => SEARCH_NAMESPACE,
            LookupKind::Geocode => GEOCODE_NAMESPACE,
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single lookup against the address provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LookupRequest {
    /// Free-text address search.
    TextQuery {
        /// The query exactly as the caller typed it
        query: String,
    },
    /// Reverse geocoding of a coordinate pair.
    Coordinates {
        /// Latitude as decimal text
        latitude: String,
        /// Longitude as decimal text
        longitude: String,
    },
}

impl LookupRequest {
    /// Creates a free-text search request.
    pub fn text(query: impl Into<String>) -> Self {
        LookupRequest::TextQuery {
            query: query.into(),
        }
    }

    /// Creates a reverse geocoding request.
    pub fn coordinates(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        LookupRequest::Coordinates {
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }

    /// Returns the kind of this request.
    pub fn kind(&self) -> LookupKind {
        match self {
            LookupRequest::TextQuery { .. } => LookupKind::Search,
            LookupRequest::Coordinates { .. } => LookupKind::Geocode,
        }
    }

    /// Rejects requests that cannot be looked up.
    ///
    /// Queries and coordinates must not be blank. Coordinates must not contain
    /// the key separator, otherwise `("1:2", "3")` and `("1", "2:3")` would
    /// share a cache key.
    pub fn validate(&self) -> Result<()> {
        match self {
            LookupRequest::TextQuery { query } => {
                if query.trim().is_empty() {
                    return Err(GeoError::ValidationError("query must not be empty".into()));
                }
            }
            LookupRequest::Coordinates {
                latitude,
                longitude,
            } => {
                if latitude.trim().is_empty() || longitude.trim().is_empty() {
                    return Err(GeoError::ValidationError(
                        "lat and lng must not be empty".into(),
                    ));
                }
                if latitude.contains(KEY_SEPARATOR) || longitude.contains(KEY_SEPARATOR) {
                    return Err(GeoError::ValidationError(format!(
                        "lat and lng must not contain '{KEY_SEPARATOR}'"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Derives the cache key for this request.
    ///
    /// Fields are used verbatim: queries are not trimmed or case-folded, and
    /// coordinates are not rounded, so `"55.76"` and `"55.760"` are distinct keys.
    /// Keys are injective only over requests that pass [`validate`](Self::validate).
    pub fn cache_key(&self) -> CacheKey {
        let namespace = self.kind().namespace();
        let key = match self {
            LookupRequest::TextQuery { query } => {
                format!("{namespace}{KEY_SEPARATOR}{query}")
            }
            LookupRequest::Coordinates {
                latitude,
                longitude,
            } => format!("{namespace}{KEY_SEPARATOR}{latitude}{KEY_SEPARATOR}{longitude}"),
        };
        CacheKey(key)
    }
}

impl fmt::Display for LookupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupRequest::TextQuery { query } => write!(f, "search \"{query}\""),
            LookupRequest::Coordinates {
                latitude,
                longitude,
            } => write!(f, "geocode ({latitude}, {longitude})"),
        }
    }
}

/// Cache key derived from a [`LookupRequest`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Returns the key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key and returns the text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
