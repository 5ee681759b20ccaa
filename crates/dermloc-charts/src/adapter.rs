//! Generic "fetch series, shape it, handle empty or error" adapter.
//!
//! Every dashboard chart is a [`SeriesSource`]: an endpoint path, its query
//! parameters and a function turning the decoded rows into a
//! [`ChartSeries`]. [`ChartsClient::load`] runs that shape end to end.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::ChartError;
use crate::types::ChartSeries;

/// One chart's data contract with the series backend.
pub trait SeriesSource {
    type Row: DeserializeOwned;

    /// Short name used in logs and [`ChartError::EmptySeries`].
    fn name(&self) -> String;

    /// Path relative to the API base, without a leading slash.
    fn path(&self) -> &'static str;

    fn query(&self) -> Vec<(&'static str, String)>;

    /// Shapes a non-empty row set into a chart.
    fn shape(&self, rows: Vec<Self::Row>) -> ChartSeries;
}

/// HTTP client for the series backend.
#[derive(Debug, Clone)]
pub struct ChartsClient {
    client: Client,
    base_url: Url,
}

impl ChartsClient {
    /// # Errors
    ///
    /// Returns [`ChartError::InvalidBaseUrl`] if `base_url` does not parse or
    /// [`ChartError::Http`] if the client cannot be built.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ChartError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Trailing slash so relative joins append rather than replace the
        // last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ChartError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Fetches the raw rows for `source`, possibly empty.
    ///
    /// # Errors
    ///
    /// - [`ChartError::Http`] on network failure.
    /// - [`ChartError::UnexpectedStatus`] on a non-2xx response.
    /// - [`ChartError::Deserialize`] if the body is not an array of rows.
    pub async fn fetch_rows<S: SeriesSource>(&self, source: &S) -> Result<Vec<S::Row>, ChartError> {
        let url = self
            .base_url
            .join(source.path())
            .map_err(|e| ChartError::InvalidBaseUrl {
                url: format!("{}{}", self.base_url, source.path()),
                reason: e.to_string(),
            })?;

        tracing::debug!(series = %source.name(), url = %url, "fetching chart series");
        let response = self
            .client
            .get(url.clone())
            .query(&source.query())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChartError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ChartError::Deserialize {
            context: source.name(),
            source: e,
        })
    }

    /// Fetches and shapes `source`.
    ///
    /// # Errors
    ///
    /// Everything [`ChartsClient::fetch_rows`] returns, plus
    /// [`ChartError::EmptySeries`] when the backend has no rows.
    pub async fn load<S: SeriesSource>(&self, source: &S) -> Result<ChartSeries, ChartError> {
        let rows = self.fetch_rows(source).await?;
        if rows.is_empty() {
            tracing::warn!(series = %source.name(), "chart series came back empty");
            return Err(ChartError::EmptySeries {
                series: source.name(),
            });
        }
        Ok(source.shape(rows))
    }
}
