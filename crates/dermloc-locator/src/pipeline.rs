//! Ranking and ownership filtering over one search's results.

use chrono::Utc;
use dermloc_core::{Category, Coordinate, OwnershipFilter};

use crate::classify::{
    has_dermatology_specialty, has_specialty_tags, infer_ownership, name_suggests_dermatology,
    specialty_score,
};
use crate::error::LocatorError;
use crate::gateway::RecordSource;
use crate::geo::distance_km;
use crate::normalize::normalize_records;
use crate::query::build_query;
use crate::types::{Facility, RankedFacility, RawRecord, ResultSet};

/// Upper bound on the number of facilities shown at once.
pub const MAX_DISPLAY_RESULTS: usize = 30;

/// Inputs of one search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchRequest {
    pub origin: Coordinate,
    pub radius_km: f64,
    pub category: Category,
}

/// Queries the data source and ranks what comes back.
///
/// An empty [`ResultSet`] is a normal outcome; see [`ResultSet::no_results`].
///
/// # Errors
///
/// Propagates gateway failures, typically
/// [`LocatorError::DataSourceUnavailable`].
pub async fn search<S: RecordSource>(
    source: &S,
    request: &SearchRequest,
) -> Result<ResultSet, LocatorError> {
    let query = build_query(request.origin, request.radius_km * 1000.0, request.category);
    let raw = source.fetch_records(&query).await?;
    let result = build_result_set(&raw, request);

    tracing::info!(
        category = %request.category,
        radius_km = request.radius_km,
        fetched = raw.len(),
        ranked = result.len(),
        "search complete"
    );

    Ok(result)
}

/// Normalizes, narrows, classifies and sorts raw records. Pure.
#[must_use]
pub fn build_result_set(raw: &[RawRecord], request: &SearchRequest) -> ResultSet {
    let mut facilities = normalize_records(raw);
    let mut narrowed_to_nothing = false;

    // Any raw record means the radius had something; an empty dermatology
    // set is then reported as category scoped.
    if request.category == Category::Dermatology && !raw.is_empty() {
        facilities = narrow_to_dermatology(facilities);
        narrowed_to_nothing = facilities.is_empty();
    }

    let mut ranked: Vec<RankedFacility> = facilities
        .into_iter()
        .map(|facility| rank(facility, request.origin))
        .collect();

    // Stable: equal score and distance keep input order.
    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.distance_km.total_cmp(&b.distance_km))
    });

    ResultSet {
        origin: request.origin,
        radius_km: request.radius_km,
        category: request.category,
        searched_at: Utc::now(),
        facilities: ranked,
        narrowed_to_nothing,
    }
}

/// Ownership view over a cached result set, capped at
/// [`MAX_DISPLAY_RESULTS`]. Never mutates `results`.
#[must_use]
pub fn apply_ownership_filter(results: &ResultSet, mode: OwnershipFilter) -> Vec<&RankedFacility> {
    apply_ownership_filter_capped(results, mode, MAX_DISPLAY_RESULTS)
}

/// Like [`apply_ownership_filter`] with an explicit cap.
#[must_use]
pub fn apply_ownership_filter_capped(
    results: &ResultSet,
    mode: OwnershipFilter,
    limit: usize,
) -> Vec<&RankedFacility> {
    results
        .facilities
        .iter()
        .filter(|f| mode.admits(f.ownership))
        .take(limit)
        .collect()
}

/// Hard specialty filter when structured tags exist, otherwise (or if it
/// matches nothing) a name-only match.
fn narrow_to_dermatology(facilities: Vec<Facility>) -> Vec<Facility> {
    let any_structured = facilities.iter().any(|f| has_specialty_tags(&f.tags));

    if any_structured {
        if facilities.iter().any(|f| has_dermatology_specialty(&f.tags)) {
            return facilities
                .into_iter()
                .filter(|f| has_dermatology_specialty(&f.tags))
                .collect();
        }
        tracing::debug!("specialty tags matched nothing; falling back to name matching");
    }

    facilities
        .into_iter()
        .filter(|f| name_suggests_dermatology(&f.tags))
        .collect()
}

fn rank(facility: Facility, origin: Coordinate) -> RankedFacility {
    RankedFacility {
        score: specialty_score(&facility.tags),
        distance_km: distance_km(origin, facility.coordinate),
        ownership: infer_ownership(&facility.tags),
        facility,
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
