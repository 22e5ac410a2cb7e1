//! DaData suggestions client.
//!
//! Forward search posts `{"query": ...}` to the suggest endpoint; reverse
//! geocoding posts `{"lat": ..., "lon": ...}` to the geolocate endpoint.
//! Coordinates stay strings on the wire in both directions.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use geoproxy_core::constants::{
    DEFAULT_GEOCODE_URL, DEFAULT_SEARCH_URL, DEFAULT_UPSTREAM_TIMEOUT_SECONDS, MAX_UPSTREAM_RESULTS,
};
use geoproxy_core::error::{GeoError, Result};
use geoproxy_core::traits::AddressLookup;
use geoproxy_core::types::{AddressRecord, LookupRequest, LookupResult};

/// Upstream client configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// DaData API key, sent as `Authorization: Token <key>`
    pub api_key: String,
    /// Forward search endpoint
    pub search_url: String,
    /// Reverse geocoding endpoint
    pub geocode_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Number of suggestions to ask for; provider default when unset
    pub max_results: Option<u32>,
}

impl UpstreamConfig {
    /// Creates a config for the public DaData endpoints.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            search_url: DEFAULT_SEARCH_URL.into(),
            geocode_url: DEFAULT_GEOCODE_URL.into(),
            timeout_seconds: DEFAULT_UPSTREAM_TIMEOUT_SECONDS,
            max_results: None,
        }
    }

    /// Points both endpoints at a different host, keeping DaData's paths.
    ///
    /// Useful for self-hosted DaData mirrors and for tests.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        self.search_url = format!("{base}/suggest/address");
        self.geocode_url = format!("{base}/geolocate/address");
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Limits the number of suggestions requested.
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Checks credentials, endpoint URLs and limits.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(GeoError::ConfigError("upstream API key is empty".into()));
        }
        for (name, raw) in [("search_url", &self.search_url), ("geocode_url", &self.geocode_url)] {
            let parsed = url::Url::parse(raw)
                .map_err(|e| GeoError::ConfigError(format!("invalid {name} '{raw}': {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(GeoError::ConfigError(format!(
                    "{name} must be http(s), got '{}'",
                    parsed.scheme()
                )));
            }
        }
        if self.timeout_seconds == 0 {
            return Err(GeoError::ConfigError("upstream timeout must be positive".into()));
        }
        if let Some(n) = self.max_results {
            if n == 0 || n > MAX_UPSTREAM_RESULTS {
                return Err(GeoError::ConfigError(format!(
                    "max_results must be within 1..={MAX_UPSTREAM_RESULTS}, got {n}"
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("api_key", &"<redacted>")
            .field("search_url", &self.search_url)
            .field("geocode_url", &self.geocode_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("max_results", &self.max_results)
            .finish()
    }
}

/// Client for the DaData suggestions API.
///
/// Holds one pooled `reqwest::Client`; share it behind an `Arc` across requests.
pub struct DaDataClient {
    config: UpstreamConfig,
    http_client: reqwest::Client,
}

impl DaDataClient {
    /// Creates a client after validating the configuration.
    pub fn with_config(config: UpstreamConfig) -> Result<Self> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("geoproxy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GeoError::ConfigError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Returns the configuration this client was built with.
    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    /// Posts `body` to `url` and returns the parsed suggestions.
    async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<SuggestionsResponse> {
        let response = self
            .http_client
            .post(url)
            .header("Authorization", format!("Token {}", self.config.api_key))
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(%status, body = %text, "Upstream returned an error status");
            return Err(GeoError::Transport(format!("HTTP {status}")));
        }

        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_str(&text)
            .map_err(|e| GeoError::Decode(format!("malformed suggestions response: {e}")))
    }

    fn transport_error(&self, err: reqwest::Error) -> GeoError {
        if err.is_timeout() {
            GeoError::Transport(format!(
                "request timed out after {}s",
                self.config.timeout_seconds
            ))
        } else {
            GeoError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl AddressLookup for DaDataClient {
    #[instrument(skip(self, request), fields(kind = %request.kind()))]
    async fn lookup(&self, request: &LookupRequest) -> Result<LookupResult> {
        let count = self.config.max_results;
        let response = match request {
            LookupRequest::TextQuery { query } => {
                self.post(&self.config.search_url, &SearchBody { query, count })
                    .await?
            }
            LookupRequest::Coordinates {
                latitude,
                longitude,
            } => {
                let body = GeolocateBody {
                    lat: latitude,
                    lon: longitude,
                    count,
                };
                self.post(&self.config.geocode_url, &body).await?
            }
        };

        debug!(suggestions = response.suggestions.len(), "Upstream answered");
        parse_suggestions(response)
    }
}

/// Maps provider suggestions onto records, failing with `NoResults` when empty.
fn parse_suggestions(response: SuggestionsResponse) -> Result<LookupResult> {
    let records = response
        .suggestions
        .into_iter()
        .map(|s| {
            let data = s.data;
            AddressRecord {
                street: data.street.unwrap_or_default(),
                city: data.city.unwrap_or_default(),
                country: data.country.unwrap_or_default(),
                latitude: data.geo_lat.unwrap_or_default(),
                longitude: data.geo_lon.unwrap_or_default(),
            }
        })
        .collect();
    LookupResult::new(records)
}

#[derive(Debug, Serialize)]
struct SearchBody<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<u32>,
}

#[derive(Debug, Serialize)]
struct GeolocateBody<'a> {
    lat: &'a str,
    lon: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct SuggestionsResponse {
    suggestions: Vec<Suggestion>,
}

#[derive(Debug, Deserialize)]
struct Suggestion {
    #[serde(default)]
    data: SuggestionData,
}

/// Provider fields are nullable; a null maps to an empty string.
#[derive(Debug, Default, Deserialize)]
struct SuggestionData {
    country: Option<String>,
    city: Option<String>,
    street: Option<String>,
    geo_lat: Option<String>,
    geo_lon: Option<String>,
}
