//! `search` and `geocode` command handlers.

use std::fmt::Write as _;
use std::time::Duration;

use dermloc_core::{AppConfig, Category, Coordinate, OwnershipFilter};
use dermloc_locator::{
    acquire_location, search, Fix, FixedLocation, Geocoder, LocatorError, OverpassGateway,
    RenderedView, SearchSession,
};

/// Accuracy attached to a geocoded address, in meters.
const GEOCODED_ACCURACY_M: f64 = 30.0;

#[derive(Debug)]
pub(crate) struct SearchArgs {
    pub origin: Option<(f64, f64)>,
    pub address: Option<String>,
    pub radius_km: f64,
    pub category: Category,
    pub ownership: OwnershipFilter,
    pub json: bool,
}

/// Resolves the origin, runs one search and prints the rendered view.
///
/// User-facing failures (no location, data source down, nothing found) are
/// printed as status text and do not fail the command.
///
/// # Errors
///
/// Returns an error for an invalid radius or if an HTTP client cannot be
/// built from `config`.
pub(crate) async fn run_search(config: &AppConfig, args: &SearchArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.radius_km.is_finite() && args.radius_km > 0.0,
        "radius must be a positive number of kilometers"
    );

    let geocoder = args
        .address
        .as_ref()
        .map(|_| {
            Geocoder::new(
                &config.nominatim_url,
                config.request_timeout_secs,
                &config.user_agent,
            )
        })
        .transpose()?;

    let timeout = Duration::from_secs(config.geolocation_timeout_secs);
    let fix = match resolve_origin(geocoder.as_ref(), args, timeout).await {
        Ok(fix) => fix,
        Err(e) => {
            println!("{}", e.user_message());
            return Ok(());
        }
    };

    let gateway = OverpassGateway::new(
        &config.overpass_endpoints,
        config.request_timeout_secs,
        &config.user_agent,
    )?;

    let mut session = SearchSession::new(config.max_results);
    session.set_location(fix.coordinate, fix.accuracy_m);
    session.set_filter(args.ownership);

    let ticket = session.begin_search(args.radius_km, args.category);
    let outcome = search(&gateway, ticket.request()).await;

    match session.complete_search(ticket, outcome) {
        Ok(view) if args.json => println!("{}", serde_json::to_string_pretty(view)?),
        Ok(view) => print!("{}", format_view(view)),
        Err(e) => {
            tracing::error!(error = %e, code = e.code(), "search failed");
            println!("{}", e.user_message());
        }
    }

    Ok(())
}

/// Prints the coordinate found for `query`.
///
/// # Errors
///
/// Returns an error if the geocoding client cannot be built.
pub(crate) async fn run_geocode(config: &AppConfig, query: &str) -> anyhow::Result<()> {
    let geocoder = Geocoder::new(
        &config.nominatim_url,
        config.request_timeout_secs,
        &config.user_agent,
    )?;
    match geocoder.geocode(query).await {
        Ok(coordinate) => println!("{coordinate}"),
        Err(e) => {
            tracing::warn!(error = %e, "geocoding failed");
            println!("{}", e.user_message());
        }
    }
    Ok(())
}

async fn resolve_origin(
    geocoder: Option<&Geocoder>,
    args: &SearchArgs,
    timeout: Duration,
) -> Result<Fix, LocatorError> {
    let provider = if let (Some(geocoder), Some(address)) = (geocoder, &args.address) {
        let coordinate = geocoder.geocode(address).await?;
        FixedLocation::new(coordinate, Some(GEOCODED_ACCURACY_M))
    } else if let Some((lat, lon)) = args.origin {
        FixedLocation::new(Coordinate::new(lat, lon), None)
    } else {
        tracing::info!("no location given; searching from the centre of Brazil");
        FixedLocation::new(Coordinate::BRAZIL_CENTER, None)
    };

    acquire_location(&provider, timeout).await
}

/// Plain-text rendering of a view for the terminal.
pub(crate) fn format_view(view: &RenderedView) -> String {
    let mut out = String::new();
    if let Some(status) = &view.status {
        let _ = writeln!(out, "{status}");
        return out;
    }

    for (i, item) in view.items.iter().enumerate() {
        let _ = writeln!(out, "{}. {} [{}]", i + 1, item.name, item.badge);
        let _ = writeln!(out, "   {}", item.meta);
        let _ = writeln!(out, "   Route (OSM): {}", item.links.route_osm);
        let _ = writeln!(out, "   Route (Google): {}", item.links.route_google);
        if let Some(phone) = &item.links.phone {
            let _ = writeln!(out, "   Call: {phone}");
        }
        if let Some(site) = &item.links.website {
            let _ = writeln!(out, "   Website: {site}");
        }
    }
    out
}
