use thiserror::Error;

/// Errors returned while loading chart series.
#[derive(Debug, Error)]
pub enum ChartError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected rows.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid charts API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("no data for series '{series}'")]
    EmptySeries { series: String },

    #[error("unknown forecast model: {0}")]
    UnknownModel(String),

    #[error("no forecast model returned data (tried {})", .tried.join(", "))]
    AllModelsFailed { tried: Vec<String> },
}
