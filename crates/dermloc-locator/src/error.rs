use thiserror::Error;

/// Errors surfaced by the facility search pipeline.
///
/// The user-facing members (`DataSourceUnavailable`, `NoResults`,
/// `LocationUnavailable`, `GeocodeNotFound`) are recovered where they occur
/// and rendered as status text via [`LocatorError::user_message`].
#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid endpoint URL \"{url}\": {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("no geodata endpoints configured")]
    NoEndpoints,

    #[error("geodata service unavailable after {attempts} endpoint(s): {last_error}")]
    DataSourceUnavailable {
        attempts: usize,
        #[source]
        last_error: Box<LocatorError>,
    },

    #[error("no results (category scoped: {category_scoped})")]
    NoResults { category_scoped: bool },

    #[error("location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("address not found: {query}")]
    GeocodeNotFound { query: String },

    #[error("search {generation} was superseded by a newer search")]
    Superseded { generation: u64 },
}

impl LocatorError {
    /// Status text shown in place of the result list.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            LocatorError::NoResults {
                category_scoped: false,
            } => "No results found within this radius. Try a larger radius or a different type."
                .to_string(),
            LocatorError::NoResults {
                category_scoped: true,
            } => "No dermatology locations found within this radius. Try a larger radius or use \"All\"."
                .to_string(),
            LocatorError::LocationUnavailable(reason) => {
                format!("Could not get your location: {reason}")
            }
            LocatorError::GeocodeNotFound { .. } => "Address not found.".to_string(),
            LocatorError::Superseded { .. } => String::new(),
            _ => "Error searching for locations. Please try again shortly.".to_string(),
        }
    }

    /// Stable machine-readable code for API error bodies.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            LocatorError::DataSourceUnavailable { .. } => "data_source_unavailable",
            LocatorError::NoResults { .. } => "no_results",
            LocatorError::LocationUnavailable(_) => "location_unavailable",
            LocatorError::GeocodeNotFound { .. } => "geocode_not_found",
            LocatorError::Superseded { .. } => "superseded",
            LocatorError::InvalidEndpoint { .. } | LocatorError::NoEndpoints => "bad_config",
            LocatorError::Http(_)
            | LocatorError::Deserialize { .. }
            | LocatorError::UnexpectedStatus { .. } => "upstream_error",
        }
    }
}
