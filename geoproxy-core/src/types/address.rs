//! Address records and lookup results.
//!
//! Coordinates are carried as the provider's decimal text and are never parsed
//! into floating point. The same text flows from the provider, through the
//! cache, to the caller.

use serde::{Deserialize, Serialize};

use crate::error::{GeoError, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// ADDRESS RECORD
// ═══════════════════════════════════════════════════════════════════════════════

/// A single candidate address.
///
/// Serialized with the field names the HTTP API has always used
/// (`street`, `city`, `country`, `lat`, `lng`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Street name, possibly with house number
    pub street: String,
    /// City or settlement
    pub city: String,
    /// Country name
    pub country: String,
    /// Latitude as decimal text, exactly as the provider returned it
    #[serde(rename = "lat")]
    pub latitude: String,
    /// Longitude as decimal text, exactly as the provider returned it
    #[serde(rename = "lng")]
    pub longitude: String,
}

impl AddressRecord {
    /// Creates a record from its parts.
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
        latitude: impl Into<String>,
        longitude: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            country: country.into(),
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOOKUP RESULT
// ═══════════════════════════════════════════════════════════════════════════════

/// Rank-ordered candidates for one lookup.
///
/// A successful result always holds at least one record; "nothing found" is
/// reported as [`GeoError::NoResults`] instead, so an empty list can never be
/// mistaken for a cacheable hit. Decoding an empty list fails the same way
/// construction does.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<AddressRecord>", into = "Vec<AddressRecord>")]
pub struct LookupResult {
    records: Vec<AddressRecord>,
}

impl LookupResult {
    /// Wraps provider records, rejecting an empty list with `NoResults`.
    pub fn new(records: Vec<AddressRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(GeoError::NoResults);
        }
        Ok(Self { records })
    }

    /// Returns the records in provider rank order.
    pub fn records(&self) -> &[AddressRecord] {
        &self.records
    }

    /// Returns the best-ranked record.
    pub fn best(&self) -> &AddressRecord {
        &self.records[0]
    }

    /// Returns the number of records (always at least one).
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Consumes the result and returns the records.
    pub fn into_records(self) -> Vec<AddressRecord> {
        self.records
    }

    /// Serializes the result into its cache payload (a JSON array of records).
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.records)?)
    }

    /// Decodes a cache payload produced by [`LookupResult::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let records: Vec<AddressRecord> = serde_json::from_slice(bytes)?;
        Self::new(records).map_err(|_| GeoError::Decode("empty lookup result payload".into()))
    }
}

impl TryFrom<Vec<AddressRecord>> for LookupResult {
    type Error = GeoError;

    fn try_from(records: Vec<AddressRecord>) -> Result<Self> {
        Self::new(records)
    }
}

impl From<LookupResult> for Vec<AddressRecord> {
    fn from(result: LookupResult) -> Self {
        result.records
    }
}

impl<'a> IntoIterator for &'a LookupResult {
    type Item = &'a AddressRecord;
    type IntoIter = std::slice::Iter<'a, AddressRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
