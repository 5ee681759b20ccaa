//! Nearby dermatology care search.
//!
//! Builds a tag query for the geodata service, fetches raw records with
//! endpoint fallback, normalizes and classifies them, ranks by specialty
//! relevance and distance, and renders the list and map views from the same
//! filtered slice.

pub mod classify;
pub mod error;
pub mod gateway;
pub mod geo;
pub mod geocode;
pub mod location;
pub mod normalize;
pub mod pipeline;
pub mod presentation;
pub mod query;
pub mod session;
pub mod types;

pub use classify::{has_dermatology_specialty, infer_ownership, specialty_score};
pub use error::LocatorError;
pub use gateway::{OverpassGateway, RecordSource};
pub use geo::distance_km;
pub use geocode::Geocoder;
pub use location::{acquire_location, Fix, FixedLocation, LocationProvider, ProviderError};
pub use normalize::{normalize, normalize_records};
pub use pipeline::{
    apply_ownership_filter, apply_ownership_filter_capped, build_result_set, search, SearchRequest,
    MAX_DISPLAY_RESULTS,
};
pub use presentation::{render, safe_http_url, ItemLinks, ListItem, MapMarker, RenderedView, UserMarker};
pub use query::{build_query, QueryText};
pub use session::{search_shared, SearchSession, SearchTicket, SharedSession};
pub use types::{Facility, RankedFacility, RawRecord, ResultSet};
