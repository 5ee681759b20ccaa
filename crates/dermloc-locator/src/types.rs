//! Raw geodata records and the facility shapes derived from them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use dermloc_core::{Category, Coordinate, Ownership};
use serde::{Deserialize, Serialize};

use crate::error::LocatorError;

/// Top-level response body from the geodata query service.
///
/// Elements are kept as loose JSON so one odd record cannot sink the
/// whole response; each is converted with [`RawRecord::from_value`].
#[derive(Debug, Deserialize)]
pub(crate) struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawCenter {
    pub lat: f64,
    pub lon: f64,
}

/// One tagged entity as returned by the geodata service. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Entity kind: `node`, `way` or `relation`.
    #[serde(rename = "type", default)]
    pub kind: String,
    pub id: u64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub center: Option<RawCenter>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl RawRecord {
    /// Converts a loose JSON element.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError::Deserialize`] when the element lacks an id or
    /// carries values of the wrong shape.
    pub fn from_value(value: serde_json::Value) -> Result<Self, LocatorError> {
        serde_json::from_value(value).map_err(|source| LocatorError::Deserialize {
            context: "geodata element".to_string(),
            source,
        })
    }

    /// Stable identity across one response, e.g. `node/123`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}/{}", self.kind, self.id)
    }
}

/// A normalized point of care.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facility {
    pub id: String,
    pub coordinate: Coordinate,
    pub name: String,
    /// Comma-joined street, house number and city; empty when none are tagged.
    pub address: String,
    pub phone: String,
    pub website: String,
    /// Original tags, retained for classification.
    pub tags: BTreeMap<String, String>,
}

/// A facility with the fields computed once per search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedFacility {
    #[serde(flatten)]
    pub facility: Facility,
    pub score: u32,
    pub distance_km: f64,
    pub ownership: Ownership,
}

/// The full ranked, pre-filter output of one search.
///
/// Replaced wholesale on each new search and read-only afterwards; ownership
/// filtering produces views over it without mutating it.
#[derive(Debug, Clone, Serialize)]
pub struct ResultSet {
    pub origin: Coordinate,
    pub radius_km: f64,
    pub category: Category,
    pub searched_at: DateTime<Utc>,
    pub facilities: Vec<RankedFacility>,
    /// Records came back but the dermatology narrowing removed all of them.
    #[serde(skip)]
    pub(crate) narrowed_to_nothing: bool,
}

impl ResultSet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    /// The reportable empty-state outcome, if this set has no facilities.
    #[must_use]
    pub fn no_results(&self) -> Option<LocatorError> {
        self.is_empty().then_some(LocatorError::NoResults {
            category_scoped: self.narrowed_to_nothing,
        })
    }
}
