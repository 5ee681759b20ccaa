//! Shared domain types: coordinates, search categories and ownership.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// A WGS84 latitude/longitude pair in degrees.
///
/// No range validation is applied; only finiteness is checked where a
/// coordinate enters the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Geographic centre of Brazil, used before the user picks a location.
    pub const BRAZIL_CENTER: Coordinate = Coordinate {
        lat: -14.235,
        lon: -51.9253,
    };

    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// Which family of facilities a search targets. Closed set; unknown
/// strings are rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Hospital,
    Clinic,
    #[serde(alias = "derm")]
    Dermatology,
    All,
}

impl Category {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Hospital => "hospital",
            Category::Clinic => "clinic",
            Category::Dermatology => "dermatology",
            Category::All => "all",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hospital" => Ok(Category::Hospital),
            "clinic" => Ok(Category::Clinic),
            "dermatology" | "derm" => Ok(Category::Dermatology),
            "all" => Ok(Category::All),
            other => Err(CoreError::InvalidCategory(other.to_string())),
        }
    }
}

/// Inferred operating entity of a facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ownership {
    Public,
    Private,
    Unknown,
}

impl Ownership {
    /// Short badge label shown next to a facility name.
    #[must_use]
    pub fn badge_label(self) -> &'static str {
        match self {
            Ownership::Public => "Public",
            Ownership::Private => "Private",
            Ownership::Unknown => "Unknown",
        }
    }
}

/// Post-hoc view filter over a cached result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnershipFilter {
    #[default]
    All,
    Public,
    Private,
}

impl OwnershipFilter {
    #[must_use]
    pub fn admits(self, ownership: Ownership) -> bool {
        match self {
            OwnershipFilter::All => true,
            OwnershipFilter::Public => ownership == Ownership::Public,
            OwnershipFilter::Private => ownership == Ownership::Private,
        }
    }
}

impl FromStr for OwnershipFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "" => Ok(OwnershipFilter::All),
            "public" => Ok(OwnershipFilter::Public),
            "private" => Ok(OwnershipFilter::Private),
            other => Err(CoreError::InvalidOwnershipFilter(other.to_string())),
        }
    }
}
