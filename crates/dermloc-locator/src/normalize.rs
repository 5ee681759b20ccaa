//! Normalization from raw geodata records to [`Facility`].

use std::collections::HashSet;

use dermloc_core::Coordinate;

use crate::types::{Facility, RawRecord};

/// Display name used when a record carries no usable `name` tag.
pub const DEFAULT_FACILITY_NAME: &str = "Health facility";

/// Normalizes one raw record, or returns `None` when it cannot be located.
///
/// A direct `lat`/`lon` pair wins over `center`; if neither pair is complete
/// and finite the record is dropped.
#[must_use]
pub fn normalize(raw: &RawRecord) -> Option<Facility> {
    let coordinate = locate(raw)?;

    let name = tag(raw, "name")
        .map_or_else(|| DEFAULT_FACILITY_NAME.to_string(), ToOwned::to_owned);

    let address = ["addr:street", "addr:housenumber", "addr:city"]
        .iter()
        .filter_map(|key| tag(raw, key))
        .collect::<Vec<_>>()
        .join(", ");

    let phone = tag(raw, "phone")
        .or_else(|| tag(raw, "contact:phone"))
        .unwrap_or_default()
        .to_string();
    let website = tag(raw, "website")
        .or_else(|| tag(raw, "contact:website"))
        .unwrap_or_default()
        .to_string();

    Some(Facility {
        id: raw.key(),
        coordinate,
        name,
        address,
        phone,
        website,
        tags: raw.tags.clone(),
    })
}

/// Normalizes a batch, dropping unlocatable records and repeated ids.
///
/// The first occurrence of an id wins; input order is preserved.
#[must_use]
pub fn normalize_records(raw: &[RawRecord]) -> Vec<Facility> {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut facilities = Vec::with_capacity(raw.len());
    let mut unlocatable = 0usize;

    for record in raw {
        let Some(facility) = normalize(record) else {
            unlocatable += 1;
            continue;
        };
        if seen.insert(facility.id.clone()) {
            facilities.push(facility);
        } else {
            tracing::warn!(id = %facility.id, "dropping duplicate geodata record");
        }
    }

    if unlocatable > 0 {
        tracing::warn!(unlocatable, "dropped records without a usable coordinate");
    }

    facilities
}

fn locate(raw: &RawRecord) -> Option<Coordinate> {
    let direct = raw.lat.zip(raw.lon).map(|(lat, lon)| Coordinate::new(lat, lon));
    let center = raw.center.map(|c| Coordinate::new(c.lat, c.lon));
    direct.or(center).filter(Coordinate::is_finite)
}

/// Trimmed, non-blank tag value.
fn tag<'a>(raw: &'a RawRecord, key: &str) -> Option<&'a str> {
    raw.tags
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
