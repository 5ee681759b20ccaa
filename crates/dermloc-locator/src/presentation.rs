//! Map and list views derived from one filtered slice.
//!
//! [`render`] builds both views in a single pass over the same slice, so a
//! marker exists for an item exactly when a list entry does.

use dermloc_core::{Coordinate, Ownership};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::Url;
use serde::Serialize;

use crate::types::RankedFacility;

/// Status shown when the ownership filter leaves nothing to display.
pub const FILTER_EMPTY_MESSAGE: &str =
    "No results for this filter. Try changing the ownership filter, the type, or a larger radius.";

/// Shown in place of an empty address.
pub const ADDRESS_NOT_PROVIDED: &str = "Address not provided";

/// Characters escaped inside the OSM `route` parameter.
const ROUTE_ENCODE_SET: &AsciiSet = &CONTROLS.add(b' ').add(b',').add(b';');

/// Smallest accuracy circle drawn around the user marker, in meters.
const MIN_ACCURACY_RADIUS_M: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserMarker {
    pub coordinate: Coordinate,
    /// Present only when the location came with an accuracy estimate.
    pub accuracy_radius_m: Option<f64>,
}

/// Outbound actions for one facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemLinks {
    pub route_osm: String,
    pub route_google: String,
    pub phone: Option<String>,
    /// Set only for http/https URLs.
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub id: String,
    pub coordinate: Coordinate,
    pub title: String,
    pub address: String,
    pub phone: Option<String>,
    pub links: ItemLinks,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItem {
    pub id: String,
    pub name: String,
    pub ownership: Ownership,
    pub badge: &'static str,
    /// `"<address> • <distance> km"`.
    pub meta: String,
    pub distance_km: f64,
    pub score: u32,
    pub links: ItemLinks,
}

/// Both views of one result slice, plus an optional status line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedView {
    pub origin: Coordinate,
    pub user_marker: UserMarker,
    pub markers: Vec<MapMarker>,
    pub items: Vec<ListItem>,
    pub status: Option<String>,
}

impl RenderedView {
    /// A view with no facilities and a status message in their place.
    #[must_use]
    pub fn status_only(origin: Coordinate, accuracy_m: Option<f64>, message: impl Into<String>) -> Self {
        Self {
            origin,
            user_marker: user_marker(origin, accuracy_m),
            markers: Vec::new(),
            items: Vec::new(),
            status: Some(message.into()),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Renders `slice` into fresh marker and list collections.
#[must_use]
pub fn render(origin: Coordinate, accuracy_m: Option<f64>, slice: &[&RankedFacility]) -> RenderedView {
    if slice.is_empty() {
        return RenderedView::status_only(origin, accuracy_m, FILTER_EMPTY_MESSAGE);
    }

    let mut markers = Vec::with_capacity(slice.len());
    let mut items = Vec::with_capacity(slice.len());

    for ranked in slice {
        let facility = &ranked.facility;
        let links = item_links(origin, ranked);
        let address = if facility.address.is_empty() {
            ADDRESS_NOT_PROVIDED.to_string()
        } else {
            facility.address.clone()
        };

        markers.push(MapMarker {
            id: facility.id.clone(),
            coordinate: facility.coordinate,
            title: facility.name.clone(),
            address: address.clone(),
            phone: non_empty(&facility.phone),
            links: links.clone(),
        });
        items.push(ListItem {
            id: facility.id.clone(),
            name: facility.name.clone(),
            ownership: ranked.ownership,
            badge: ranked.ownership.badge_label(),
            meta: format!("{address} • {:.1} km", ranked.distance_km),
            distance_km: ranked.distance_km,
            score: ranked.score,
            links,
        });
    }

    RenderedView {
        origin,
        user_marker: user_marker(origin, accuracy_m),
        markers,
        items,
        status: None,
    }
}

/// Returns the normalized URL if `raw` parses with an http or https scheme.
#[must_use]
pub fn safe_http_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

/// Driving directions from `origin` to `dest` on openstreetmap.org.
#[must_use]
pub fn osm_route_url(origin: Coordinate, dest: Coordinate) -> String {
    let route = format!("{},{};{},{}", origin.lat, origin.lon, dest.lat, dest.lon);
    format!(
        "https://www.openstreetmap.org/directions?engine=fossgis_osrm_car&route={}",
        utf8_percent_encode(&route, ROUTE_ENCODE_SET)
    )
}

#[must_use]
pub fn google_route_url(dest: Coordinate) -> String {
    format!(
        "https://www.google.com/maps/dir/?api=1&destination={},{}",
        dest.lat, dest.lon
    )
}

/// `tel:` link with all whitespace stripped.
#[must_use]
pub fn tel_link(phone: &str) -> Option<String> {
    let digits: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    (!digits.is_empty()).then(|| format!("tel:{digits}"))
}

fn item_links(origin: Coordinate, ranked: &RankedFacility) -> ItemLinks {
    let facility = &ranked.facility;
    ItemLinks {
        route_osm: osm_route_url(origin, facility.coordinate),
        route_google: google_route_url(facility.coordinate),
        phone: tel_link(&facility.phone),
        website: if facility.website.is_empty() {
            None
        } else {
            safe_http_url(&facility.website)
        },
    }
}

fn user_marker(origin: Coordinate, accuracy_m: Option<f64>) -> UserMarker {
    UserMarker {
        coordinate: origin,
        accuracy_radius_m: accuracy_m
            .filter(|a| a.is_finite())
            .map(|a| a.max(MIN_ACCURACY_RADIUS_M)),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
